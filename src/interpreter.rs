//! API to control the interpreter.

use std::io::prelude::*;

use thiserror::Error;

use crate::ast::Program;
use crate::diag::Position;
use crate::eval::{EvalError, Evaluator, DEFAULT_MAX_CALL_DEPTH};
use crate::lexer::Limits;
use crate::parser::{ParseError, Parser};
use crate::value::Value;

/// Tree-walk interpreter.
///
/// # Example
///
/// Invoke the interpreter a first time to define a function then additional times to call this
/// function:
///
/// ```
/// # use brisk::interpreter::{Interpreter, InterpreterError};
/// # use brisk::value::Value;
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// let func_def = r#"
///     fn max(x, y) {
///         if (x > y) {
///             return x;
///         } else {
///             return y;
///         }
///     }
/// "#;
/// interp.eval(func_def.as_bytes())?;
///
/// interp.eval("print(max(10, 20));".as_bytes()).expect("interpreter error");
/// let v = interp.eval("max(5, 4);".as_bytes()).expect("interpreter error");
/// drop(interp);
///
/// assert_eq!(v, Value::Integer(5));
/// assert_eq!(output, b"20\n");
/// # Ok::<(), InterpreterError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    limits: Limits,
    evaluator: Evaluator<'t, W>,
}

/// Errors the interpreter can raise.
#[derive(Debug, Error)]
pub enum InterpreterError {
    /// Error occurring during lexical or syntactic analysis.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Error occurring during evaluation.
    #[error("runtime error: {0}")]
    Runtime(#[from] EvalError),
}

impl InterpreterError {
    /// Where in the source the error was detected, for errors raised before evaluation.
    pub fn position(&self) -> Option<Position> {
        match self {
            InterpreterError::Parse(e) => e.position(),
            InterpreterError::Runtime(_) => None,
        }
    }
}

impl<'t, W: Write> Interpreter<'t, W> {
    /// Creates a new interpreter writing to `output`.
    pub fn new(output: &'t mut W) -> Interpreter<'t, W> {
        Interpreter::with_limits(output, Limits::default())
    }

    /// Creates a new interpreter whose lexer and parser enforce `limits`.
    pub fn with_limits(output: &'t mut W, limits: Limits) -> Interpreter<'t, W> {
        Interpreter::with_call_depth(output, limits, DEFAULT_MAX_CALL_DEPTH)
    }

    /// Like `with_limits`, also bounding nested function calls to `max_call_depth`.
    pub fn with_call_depth(
        output: &'t mut W,
        limits: Limits,
        max_call_depth: usize,
    ) -> Interpreter<'t, W> {
        Interpreter {
            limits,
            evaluator: Evaluator::with_max_depth(output, max_call_depth),
        }
    }

    /// Interprets `input` in the session scope and returns the value of its last statement.
    ///
    /// Declarations survive across calls.
    pub fn eval<R: BufRead>(&mut self, input: R) -> Result<Value, InterpreterError> {
        let program = self.parse(input)?;
        Ok(self.evaluator.run_in_session(&program)?)
    }

    /// Interprets `input` in a fresh root scope dropped afterwards.
    ///
    /// Session declarations are visible but the program's own are not kept.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<Value, InterpreterError> {
        let program = self.parse(input)?;
        Ok(self.evaluator.run(&program)?)
    }

    /// Parses `input` without evaluating it.
    pub fn parse<R: BufRead>(&self, input: R) -> Result<Program, InterpreterError> {
        Ok(Parser::with_limits(input, self.limits).parse()?)
    }
}
