//! Lexical analyzer

use std::io::prelude::*;

use thiserror::Error;
use tracing::trace;

use crate::char_reader::{CharReader, CharReaderError};
use crate::diag::{LexErrorKind, Position};
use crate::token::{self, Lexem, Token};

/// Default upper bound on identifier, string literal and comment length, in characters.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 1200;

/// Default upper bound on nested expressions and blocks.
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Bounds on the source text.
///
/// The lexer enforces the three length bounds.  `nesting` is checked by the parser, which counts
/// every expression, block and `else if` it descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub identifier: usize,
    pub string: usize,
    pub comment: usize,
    pub nesting: usize,
}

impl Limits {
    /// Same bound for every kind of long token, default nesting.
    pub fn uniform(max: usize) -> Limits {
        Limits {
            identifier: max,
            string: max,
            comment: max,
            nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_nesting(self, nesting: usize) -> Limits {
        Limits { nesting, ..self }
    }
}

impl Default for Limits {
    fn default() -> Limits {
        Limits::uniform(DEFAULT_MAX_TOKEN_LENGTH)
    }
}

/// Turn a sequence of characters into a sequence of positioned tokens.
///
/// Once the end of input is reached, `next_lexem()` keeps returning `Token::EndOfFile`.
#[derive(Debug)]
pub struct Lexer<R: BufRead> {
    input: CharReader<R>,
    limits: Limits,

    // Set once the iterator has yielded end of file or an error.
    finished: bool,

    // Buffer used when scanning longer tokens.  Allocated here to reuse memory.
    buf: String,
}

impl<R: BufRead> Lexer<R> {
    /// Creates a new lexer operating on `input`.
    pub fn new(input: R) -> Lexer<R> {
        Lexer::with_limits(input, Limits::default())
    }

    pub fn with_limits(input: R, limits: Limits) -> Lexer<R> {
        Lexer {
            input: CharReader::new(input),
            limits,
            finished: false,
            buf: String::new(),
        }
    }

    /// Scan next token and return it.
    pub fn next_lexem(&mut self) -> Result<Lexem, LexError> {
        let lexem = self.scan()?;
        trace!(token = ?lexem.token, line = lexem.line, column = lexem.column, "scanned");
        Ok(lexem)
    }

    fn scan(&mut self) -> Result<Lexem, LexError> {
        loop {
            let start = self.input.position();
            let Some(ch) = self.input.bump()? else {
                return Ok(Lexem::new(Token::EndOfFile, start));
            };
            let token = match ch {
                c if c.is_whitespace() => continue,
                '/' => match self.input.peek()? {
                    Some('/') => {
                        self.skip_line_comment(start)?;
                        continue;
                    }
                    Some('*') => {
                        self.skip_block_comment(start)?;
                        continue;
                    }
                    _ => Token::Slash,
                },
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '%' => Token::Percent,
                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '{' => Token::LeftCurly,
                '}' => Token::RightCurly,
                '[' => Token::LeftBracket,
                ']' => Token::RightBracket,
                ',' => Token::Comma,
                ';' => Token::Semicolon,
                '#' => Token::Hash,
                '$' => Token::Dollar,
                '=' => self.either('=', Token::EqualEqual, Token::Assign)?,
                '!' => self.either('=', Token::BangEqual, Token::Bang)?,
                '>' => self.either('=', Token::GreaterEqual, Token::Greater)?,
                '|' => self.either('|', Token::OrOr, Token::Pipe)?,
                '<' => match self.input.peek()? {
                    Some('=') => {
                        self.input.bump()?;
                        Token::LessEqual
                    }
                    Some('-') => {
                        self.input.bump()?;
                        Token::Arrow
                    }
                    _ => Token::Less,
                },
                '&' => {
                    if self.input.peek()? == Some('&') {
                        self.input.bump()?;
                        Token::AndAnd
                    } else {
                        return Err(LexError::invalid(start, LexErrorKind::NotAToken('&')));
                    }
                }
                '"' => self.scan_string(start)?,
                '0'..='9' => self.scan_number(ch, start)?,
                'a'..='z' | 'A'..='Z' | '_' => self.scan_identifier(ch, start)?,
                _ => return Err(LexError::invalid(start, LexErrorKind::NotAToken(ch))),
            };
            return Ok(Lexem::new(token, start));
        }
    }

    /// Returns `long` and consumes `second` if it is the next character, `short` otherwise.
    fn either(&mut self, second: char, long: Token, short: Token) -> Result<Token, LexError> {
        if self.input.peek()? == Some(second) {
            self.input.bump()?;
            Ok(long)
        } else {
            Ok(short)
        }
    }

    /// Current character is the second `/`.  The line break is left for the main loop.
    fn skip_line_comment(&mut self, start: Position) -> Result<(), LexError> {
        self.input.bump()?;
        let mut len = 0;
        while let Some(ch) = self.input.peek()? {
            if ch == '\n' || ch == '\r' {
                break;
            }
            self.input.bump()?;
            len += 1;
            if len > self.limits.comment {
                return Err(LexError::invalid(
                    start,
                    LexErrorKind::CommentTooLong {
                        max: self.limits.comment,
                    },
                ));
            }
        }
        Ok(())
    }

    fn skip_block_comment(&mut self, start: Position) -> Result<(), LexError> {
        self.input.bump()?;
        let mut len = 0;
        loop {
            match self.input.bump()? {
                None => return Err(LexError::invalid(start, LexErrorKind::UnterminatedComment)),
                Some('*') if self.input.peek()? == Some('/') => {
                    self.input.bump()?;
                    return Ok(());
                }
                Some(_) => {
                    len += 1;
                    if len > self.limits.comment {
                        return Err(LexError::invalid(
                            start,
                            LexErrorKind::CommentTooLong {
                                max: self.limits.comment,
                            },
                        ));
                    }
                }
            }
        }
    }

    fn scan_string(&mut self, start: Position) -> Result<Token, LexError> {
        self.buf.clear();
        let mut len = 0;
        loop {
            let ch = match self.input.bump()? {
                None => return Err(LexError::invalid(start, LexErrorKind::UnterminatedString)),
                Some('"') => break,
                Some('\\') => match self.input.bump()? {
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('\\') => '\\',
                    Some('"') => '"',
                    Some(other) => {
                        return Err(LexError::invalid(start, LexErrorKind::InvalidEscape(other)))
                    }
                    None => {
                        return Err(LexError::invalid(start, LexErrorKind::UnterminatedString))
                    }
                },
                Some(ch) => ch,
            };
            len += 1;
            if len > self.limits.string {
                return Err(LexError::invalid(
                    start,
                    LexErrorKind::StringTooLong {
                        max: self.limits.string,
                    },
                ));
            }
            self.buf.push(ch);
        }
        Ok(Token::Str(self.buf.clone()))
    }

    fn scan_number(&mut self, first_digit: char, start: Position) -> Result<Token, LexError> {
        self.buf.clear();
        self.buf.push(first_digit);
        self.take_digits()?;

        if self.input.peek()? == Some('.') {
            self.input.bump()?;
            self.buf.push('.');
            self.take_digits()?;
            let n = self.buf.parse::<f64>().map_err(|_| {
                LexError::invalid(start, LexErrorKind::BadFloatLiteral(self.buf.clone()))
            })?;
            return Ok(Token::Float(n));
        }

        let n = self.buf.parse::<i32>().map_err(|_| {
            LexError::invalid(start, LexErrorKind::IntegerOutOfRange(self.buf.clone()))
        })?;
        Ok(Token::Integer(n))
    }

    fn take_digits(&mut self) -> Result<(), LexError> {
        while let Some(ch) = self.input.peek()? {
            if !ch.is_ascii_digit() {
                break;
            }
            self.input.bump()?;
            self.buf.push(ch);
        }
        Ok(())
    }

    fn scan_identifier(&mut self, first_char: char, start: Position) -> Result<Token, LexError> {
        self.buf.clear();
        self.buf.push(first_char);
        let mut len = 1;
        while let Some(ch) = self.input.peek()? {
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                break;
            }
            self.input.bump()?;
            self.buf.push(ch);
            len += 1;
            if len > self.limits.identifier {
                return Err(LexError::invalid(
                    start,
                    LexErrorKind::IdentifierTooLong {
                        max: self.limits.identifier,
                    },
                ));
            }
        }

        Ok(token::keyword(&self.buf).unwrap_or_else(|| Token::Identifier(self.buf.clone())))
    }
}

/// Yields every lexem up to and including end of file, then stops.
///
/// Iteration also stops after the first error.
impl<R: BufRead> Iterator for Lexer<R> {
    type Item = Result<Lexem, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_lexem();
        if matches!(
            item,
            Ok(Lexem {
                token: Token::EndOfFile,
                ..
            }) | Err(_)
        ) {
            self.finished = true;
        }
        Some(item)
    }
}

#[derive(Debug, Error)]
pub enum LexError {
    #[error("read error: {0}")]
    Read(#[from] CharReaderError),

    #[error("lex error: {pos}: {kind}")]
    Invalid { pos: Position, kind: LexErrorKind },
}

impl LexError {
    fn invalid(pos: Position, kind: LexErrorKind) -> LexError {
        LexError::Invalid { pos, kind }
    }

    /// Start of the offending token, if the error is tied to one.
    pub fn position(&self) -> Option<Position> {
        match self {
            LexError::Read(_) => None,
            LexError::Invalid { pos, .. } => Some(*pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lexems(input: &str) -> Result<Vec<Lexem>, LexError> {
        Lexer::new(input.as_bytes()).collect::<Result<Vec<Lexem>, LexError>>()
    }

    fn scan(input: &str) -> Result<Vec<Token>, LexError> {
        Ok(lexems(input)?
            .into_iter()
            .map(|l| l.token)
            .filter(|t| *t != Token::EndOfFile)
            .collect())
    }

    fn scan_err(input: &str) -> (Position, LexErrorKind) {
        match scan(input) {
            Err(LexError::Invalid { pos, kind }) => (pos, kind),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_string())
    }

    #[test]
    fn scan_single_token() -> Result<(), LexError> {
        assert_eq!(
            lexems("+")?,
            vec![
                Lexem::new(Token::Plus, Position::new(1, 1)),
                Lexem::new(Token::EndOfFile, Position::new(1, 2)),
            ]
        );
        Ok(())
    }

    #[test]
    fn fixed_tokens() -> Result<(), LexError> {
        assert_eq!(
            scan("+-*/% () {} [] , ; = == ! != < <= > >= && || | <- # $")?,
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Percent,
                Token::LeftParen,
                Token::RightParen,
                Token::LeftCurly,
                Token::RightCurly,
                Token::LeftBracket,
                Token::RightBracket,
                Token::Comma,
                Token::Semicolon,
                Token::Assign,
                Token::EqualEqual,
                Token::Bang,
                Token::BangEqual,
                Token::Less,
                Token::LessEqual,
                Token::Greater,
                Token::GreaterEqual,
                Token::AndAnd,
                Token::OrOr,
                Token::Pipe,
                Token::Arrow,
                Token::Hash,
                Token::Dollar,
            ]
        );
        Ok(())
    }

    #[test]
    fn two_character_operators_win_over_prefixes() -> Result<(), LexError> {
        assert_eq!(scan("<-1")?, vec![Token::Arrow, Token::Integer(1)]);
        assert_eq!(scan("< -1")?, vec![Token::Less, Token::Minus, Token::Integer(1)]);
        assert_eq!(scan("|||")?, vec![Token::OrOr, Token::Pipe]);
        assert_eq!(scan("===")?, vec![Token::EqualEqual, Token::Assign]);
        Ok(())
    }

    #[test]
    fn blanks_are_ignored() -> Result<(), LexError> {
        assert_eq!(scan(" \t\n\r\n+")?, vec![Token::Plus]);
        Ok(())
    }

    #[test]
    fn integers() -> Result<(), LexError> {
        assert_eq!(scan("0 42 007")?, vec![
            Token::Integer(0),
            Token::Integer(42),
            Token::Integer(7)
        ]);
        assert_eq!(scan("2147483647")?, vec![Token::Integer(i32::MAX)]);
        Ok(())
    }

    #[test]
    fn integer_out_of_range() {
        assert_eq!(
            scan_err("1 2147483648"),
            (
                Position::new(1, 3),
                LexErrorKind::IntegerOutOfRange("2147483648".to_string())
            )
        );
    }

    #[test]
    fn floating_point() -> Result<(), LexError> {
        assert_eq!(scan("4.2")?, vec![Token::Float(4.2)]);
        assert_eq!(scan("4.")?, vec![Token::Float(4.0)]);
        assert_eq!(scan("0.5+1")?, vec![
            Token::Float(0.5),
            Token::Plus,
            Token::Integer(1)
        ]);
        Ok(())
    }

    #[test]
    fn identifier() -> Result<(), LexError> {
        assert_eq!(
            scan("f foo _foo t42 a_b")?,
            vec![ident("f"), ident("foo"), ident("_foo"), ident("t42"), ident("a_b")]
        );
        Ok(())
    }

    #[test]
    fn keywords() -> Result<(), LexError> {
        assert_eq!(
            scan("let mut fn while if else return true false int float str bool")?,
            vec![
                Token::Let,
                Token::Mut,
                Token::Fn,
                Token::While,
                Token::If,
                Token::Else,
                Token::Return,
                Token::True,
                Token::False,
                Token::IntType,
                Token::FloatType,
                Token::StrType,
                Token::BoolType,
            ]
        );
        Ok(())
    }

    #[test]
    fn keywords_are_not_matched_as_prefixes() -> Result<(), LexError> {
        assert_eq!(
            scan("letter iff mutable strength")?,
            vec![ident("letter"), ident("iff"), ident("mutable"), ident("strength")]
        );
        Ok(())
    }

    #[test]
    fn string_with_escapes() -> Result<(), LexError> {
        assert_eq!(
            scan(r#""a\n\r\t\\\"b""#)?,
            vec![Token::Str("a\n\r\t\\\"b".to_string())]
        );
        Ok(())
    }

    #[test]
    fn string_with_embedded_line_break() -> Result<(), LexError> {
        let l = lexems("\"a\nb\" x")?;
        assert_eq!(l[0], Lexem::new(Token::Str("a\nb".to_string()), Position::new(1, 1)));
        assert_eq!(l[1], Lexem::new(ident("x"), Position::new(2, 4)));
        Ok(())
    }

    #[test]
    fn invalid_escape() {
        assert_eq!(
            scan_err("  \"a\\qb\""),
            (Position::new(1, 3), LexErrorKind::InvalidEscape('q'))
        );
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            scan_err("x\n \"abc"),
            (Position::new(2, 2), LexErrorKind::UnterminatedString)
        );
    }

    #[test]
    fn comments_are_ignored() -> Result<(), LexError> {
        assert_eq!(scan("true // false")?, vec![Token::True]);
        assert_eq!(scan("1 /* 2 \n 3 */ 4")?, vec![Token::Integer(1), Token::Integer(4)]);
        assert_eq!(scan("/**/5")?, vec![Token::Integer(5)]);
        Ok(())
    }

    #[test]
    fn tokens_after_multi_line_comment_report_end_position() -> Result<(), LexError> {
        let l = lexems("/* a\r\nb\rc */ x")?;
        assert_eq!(l[0], Lexem::new(ident("x"), Position::new(3, 6)));
        Ok(())
    }

    #[test]
    fn unterminated_comment() {
        assert_eq!(
            scan_err("1 /* never closed *"),
            (Position::new(1, 3), LexErrorKind::UnterminatedComment)
        );
    }

    #[test]
    fn lexer_keeps_track_of_lines_and_columns() -> Result<(), LexError> {
        let mut lexer = Lexer::new("1\n2 3\n  4".as_bytes());
        assert_eq!(lexer.next_lexem()?.position(), Position::new(1, 1));
        assert_eq!(lexer.next_lexem()?.position(), Position::new(2, 1));
        assert_eq!(lexer.next_lexem()?.position(), Position::new(2, 3));
        assert_eq!(lexer.next_lexem()?.position(), Position::new(3, 3));
        assert_eq!(
            lexer.next_lexem()?,
            Lexem::new(Token::EndOfFile, Position::new(3, 4))
        );
        Ok(())
    }

    #[test]
    fn end_of_file_is_returned_forever() -> Result<(), LexError> {
        let mut lexer = Lexer::new("x".as_bytes());
        lexer.next_lexem()?;
        for _ in 0..3 {
            assert_eq!(
                lexer.next_lexem()?,
                Lexem::new(Token::EndOfFile, Position::new(1, 2))
            );
        }
        Ok(())
    }

    #[test]
    fn not_a_token() {
        assert_eq!(scan_err("a @"), (Position::new(1, 3), LexErrorKind::NotAToken('@')));
        assert_eq!(scan_err("a & b"), (Position::new(1, 3), LexErrorKind::NotAToken('&')));
    }

    #[test]
    fn identifier_length_bound() -> Result<(), LexError> {
        let max = "a".repeat(DEFAULT_MAX_TOKEN_LENGTH);
        assert_eq!(scan(&max)?, vec![ident(&max)]);
        assert_eq!(
            scan_err(&format!("{}a", max)),
            (
                Position::new(1, 1),
                LexErrorKind::IdentifierTooLong {
                    max: DEFAULT_MAX_TOKEN_LENGTH
                }
            )
        );
        Ok(())
    }

    #[test]
    fn string_length_bound() -> Result<(), LexError> {
        let body = "s".repeat(DEFAULT_MAX_TOKEN_LENGTH);
        assert_eq!(scan(&format!("\"{}\"", body))?, vec![Token::Str(body.clone())]);
        assert_eq!(
            scan_err(&format!("\"{}s\"", body)),
            (
                Position::new(1, 1),
                LexErrorKind::StringTooLong {
                    max: DEFAULT_MAX_TOKEN_LENGTH
                }
            )
        );
        Ok(())
    }

    #[test]
    fn comment_length_bound() -> Result<(), LexError> {
        let body = "c".repeat(DEFAULT_MAX_TOKEN_LENGTH);
        assert_eq!(scan(&format!("//{}", body))?, vec![]);
        assert_eq!(scan(&format!("/*{}*/", body))?, vec![]);
        let too_long = LexErrorKind::CommentTooLong {
            max: DEFAULT_MAX_TOKEN_LENGTH,
        };
        assert_eq!(
            scan_err(&format!("//{}c", body)),
            (Position::new(1, 1), too_long.clone())
        );
        assert_eq!(
            scan_err(&format!("/*{}c*/", body)),
            (Position::new(1, 1), too_long)
        );
        Ok(())
    }

    #[test]
    fn custom_limits() {
        let mut lexer = Lexer::with_limits("abcd".as_bytes(), Limits::uniform(3));
        match lexer.next_lexem() {
            Err(LexError::Invalid {
                kind: LexErrorKind::IdentifierTooLong { max: 3 },
                ..
            }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }
}
