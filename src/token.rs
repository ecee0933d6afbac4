use std::fmt;

use crate::diag::Position;

/// "Words" produced by `Lexer`.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    EndOfFile,

    // Operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LeftParen,
    RightParen,
    LeftCurly,
    RightCurly,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Assign,
    EqualEqual,
    Bang,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Pipe,
    Arrow,
    Hash,
    Dollar,

    // Keywords
    Let,
    Mut,
    Fn,
    While,
    If,
    Else,
    Return,
    True,
    False,
    IntType,
    FloatType,
    StrType,
    BoolType,

    Identifier(String),
    Str(String),
    Integer(i32),
    Float(f64),
}

impl Token {
    /// Human readable token kind, used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::EndOfFile => "end of file".to_string(),
            Token::Identifier(_) => "identifier".to_string(),
            Token::Str(_) => "string literal".to_string(),
            Token::Integer(_) => "integer literal".to_string(),
            Token::Float(_) => "float literal".to_string(),
            t => format!("'{}'", t),
        }
    }
}

/// Renders the token as it could appear in source.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::EndOfFile => write!(f, "EOF"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftCurly => write!(f, "{{"),
            Token::RightCurly => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Assign => write!(f, "="),
            Token::EqualEqual => write!(f, "=="),
            Token::Bang => write!(f, "!"),
            Token::BangEqual => write!(f, "!="),
            Token::Less => write!(f, "<"),
            Token::LessEqual => write!(f, "<="),
            Token::Greater => write!(f, ">"),
            Token::GreaterEqual => write!(f, ">="),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Pipe => write!(f, "|"),
            Token::Arrow => write!(f, "<-"),
            Token::Hash => write!(f, "#"),
            Token::Dollar => write!(f, "$"),
            Token::Let => write!(f, "let"),
            Token::Mut => write!(f, "mut"),
            Token::Fn => write!(f, "fn"),
            Token::While => write!(f, "while"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::Return => write!(f, "return"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::IntType => write!(f, "int"),
            Token::FloatType => write!(f, "float"),
            Token::StrType => write!(f, "str"),
            Token::BoolType => write!(f, "bool"),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Str(s) => write!(f, "{:?}", s),
            Token::Integer(n) => write!(f, "{}", n),
            Token::Float(n) => write!(f, "{:?}", n),
        }
    }
}

/// A token tagged with the position of its first character.
#[derive(Debug, PartialEq, Clone)]
pub struct Lexem {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

impl Lexem {
    pub fn new(token: Token, pos: Position) -> Lexem {
        Lexem {
            token,
            line: pos.line,
            column: pos.column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

const KEYWORDS: [(&str, Token); 13] = [
    ("let", Token::Let),
    ("mut", Token::Mut),
    ("fn", Token::Fn),
    ("while", Token::While),
    ("if", Token::If),
    ("else", Token::Else),
    ("return", Token::Return),
    ("true", Token::True),
    ("false", Token::False),
    ("int", Token::IntType),
    ("float", Token::FloatType),
    ("str", Token::StrType),
    ("bool", Token::BoolType),
];

/// Return the token associated with `word` if it is a keyword.
pub fn keyword(word: &str) -> Option<Token> {
    KEYWORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, token)| token.clone())
}
