//! Brisk interpreter command-line.
//!
//! When called without argument it drops into an interactive read-evaluate-print loop.
//!
//! When called with file arguments, it interprets the corresponding files in a single interpreter
//! session (so code and data sharing is possible).

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{self, Context};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brisk::eval::DEFAULT_MAX_CALL_DEPTH;
use brisk::interpreter::{Interpreter, InterpreterError};
use brisk::lexer::{Limits, DEFAULT_MAX_NESTING, DEFAULT_MAX_TOKEN_LENGTH};
use brisk::value::Value;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source files, run in order in one session.
    files: Vec<PathBuf>,

    /// Run this source text instead of files.
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "files")]
    eval: Option<String>,

    /// Print the syntax tree instead of evaluating.
    #[arg(long)]
    dump_ast: bool,

    /// Longest identifier, string literal or comment accepted, in characters.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_TOKEN_LENGTH)]
    max_token_length: usize,

    /// Deepest nesting of expressions and blocks accepted by the parser.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,

    /// Deepest chain of nested function calls before evaluation fails.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let limits = Limits::uniform(args.max_token_length).with_nesting(args.max_nesting);
    let mut interp_stdout = io::stdout();
    let mut interp =
        Interpreter::with_call_depth(&mut interp_stdout, limits, args.max_call_depth);

    if let Some(source) = &args.eval {
        run_source(&mut interp, source.as_bytes(), args.dump_ast)?;
    } else if !args.files.is_empty() {
        for path in &args.files {
            let reader = BufReader::new(
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
            );
            run_source(&mut interp, reader, args.dump_ast)
                .with_context(|| format!("in {}", path.display()))?;
        }
    } else {
        run_prompt(&mut interp, args.dump_ast)?;
    }
    Ok(())
}

fn run_source<W: Write, R: BufRead>(
    interp: &mut Interpreter<'_, W>,
    input: R,
    dump_ast: bool,
) -> Result<(), anyhow::Error> {
    if dump_ast {
        print!("{}", interp.parse(input)?.dump());
    } else {
        interp.eval(input)?;
    }
    Ok(())
}

fn run_prompt<W: Write>(interp: &mut Interpreter<'_, W>, dump_ast: bool) -> Result<(), io::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();

    let mut input = String::new();
    loop {
        repl_stdout.write_all("> ".as_bytes())?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        if dump_ast {
            match interp.parse(input.as_bytes()) {
                Ok(program) => print!("{}", program.dump()),
                Err(e) => report(&e),
            }
            continue;
        }

        match interp.eval(input.as_bytes()) {
            Ok(Value::Unit) => (),
            Ok(v) => println!("{}", v),
            Err(e) => report(&e),
        }
    }

    Ok(())
}

/// Prints `e`, with a caret under the offending column when it lies on the line just typed.
fn report(e: &InterpreterError) {
    if let Some(pos) = e.position().filter(|pos| pos.line == 1) {
        // Account for the "> " prompt.
        println!("{}^", " ".repeat(pos.column + 1));
    }
    println!("{}", e);
}
