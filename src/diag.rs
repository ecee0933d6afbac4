use std::fmt;

use thiserror::Error;

/// 1-based line and column of a character in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Position {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Reasons the lexer rejects a token.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    #[error("identifier longer than {max} characters")]
    IdentifierTooLong { max: usize },
    #[error("string literal longer than {max} characters")]
    StringTooLong { max: usize },
    #[error("comment longer than {max} characters")]
    CommentTooLong { max: usize },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("integer literal {0} does not fit in 32 bits")]
    IntegerOutOfRange(String),
    #[error("cannot parse floating point literal: {0}")]
    BadFloatLiteral(String),
    #[error("not a token: '{0}'")]
    NotAToken(char),
}

/// Reasons the parser rejects a token sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken { expected: String, found: String },
    #[error("expected expression, found {found}")]
    ExpectedExpression { found: String },
    #[error("expected predicate in {statement} statement")]
    ExpectedPredicate { statement: &'static str },
    #[error("expected parameter, found {found}")]
    ExpectedParameter { found: String },
    #[error("expected type (int, float, str or bool), found {found}")]
    ExpectedType { found: String },
    #[error("expected identifier on the left of '='")]
    ExpectedLvalue,
    #[error("parameter {name} declared twice")]
    DuplicateParameter { name: String },
    #[error("nesting deeper than {max} levels")]
    NestingTooDeep { max: usize },
}
