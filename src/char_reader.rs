//! Turn a buffered byte reader into a stream of characters with source positions.
//!
//! Input is pulled one line at a time so UTF-8 validation is left to `BufRead::read_line`.
//! Line breaks are normalised: `\r`, `\n` and `\r\n` are each reported as a single `\n`.

use std::io::{self, prelude::*};

use thiserror::Error;

use crate::diag::Position;

/// Character cursor over a buffered reader.
#[derive(Debug)]
pub struct CharReader<R: BufRead> {
    input: R,

    // Characters of the line currently being consumed.
    chunk: Vec<char>,
    index: usize,
    exhausted: bool,

    line: usize,
    column: usize,
}

impl<R: BufRead> CharReader<R> {
    pub fn new(input: R) -> CharReader<R> {
        CharReader {
            input,
            chunk: vec![],
            index: 0,
            exhausted: false,
            line: 1,
            column: 1,
        }
    }

    /// Position of the next character to be returned by `bump()`.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Returns the next character without consuming it.
    ///
    /// Line breaks are not normalised here: a `\r` is returned as is.
    pub fn peek(&mut self) -> Result<Option<char>, CharReaderError> {
        self.fill()?;
        Ok(self.chunk.get(self.index).copied())
    }

    /// Consumes and returns the next character, advancing the position.
    pub fn bump(&mut self) -> Result<Option<char>, CharReaderError> {
        let Some(ch) = self.peek()? else {
            return Ok(None);
        };
        self.index += 1;
        match ch {
            '\r' => {
                if self.peek()? == Some('\n') {
                    self.index += 1;
                }
                self.new_line();
                Ok(Some('\n'))
            }
            '\n' => {
                self.new_line();
                Ok(Some('\n'))
            }
            _ => {
                self.column += 1;
                Ok(Some(ch))
            }
        }
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    fn fill(&mut self) -> Result<(), CharReaderError> {
        while self.index >= self.chunk.len() && !self.exhausted {
            let mut raw = String::new();
            let nbytes = self.input.read_line(&mut raw).map_err(|e| {
                if e.kind() == io::ErrorKind::InvalidData {
                    CharReaderError::InvalidUtf8 { line: self.line }
                } else {
                    CharReaderError::Io(e)
                }
            })?;
            if nbytes == 0 {
                self.exhausted = true;
            } else {
                self.chunk = raw.chars().collect();
                self.index = 0;
            }
        }
        Ok(())
    }
}

/// Errors raised when reading and decoding the input.
#[derive(Debug, Error)]
pub enum CharReaderError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("input is not valid UTF-8 on line {line}")]
    InvalidUtf8 { line: usize },
}
