//! Front end and tree-walking interpreter for Brisk, a small imperative scripting language.
//!
//! Source text goes through three phases, each pulling from the previous one on demand:
//! [`lexer::Lexer`] turns characters into positioned tokens, [`parser::Parser`] builds an owned
//! [`ast::Program`], and [`eval::Evaluator`] walks the tree through the [`visitor::Visitor`]
//! trait.
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - The lexer and parser do not attempt any error recovery.  They bail out on the first
//! encountered error.
//! - Functions see the bindings of their caller rather than capturing their definition site.
//! - Nesting in the source and call depth at run time are bounded (see [`lexer::Limits`] and
//! [`eval::DEFAULT_MAX_CALL_DEPTH`]) so that deep input fails with an error.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod ast;
pub mod diag;
pub mod eval;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;
pub mod value;
pub mod visitor;

mod char_reader;
mod context;
mod operators;
