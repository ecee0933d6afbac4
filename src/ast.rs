//! Abstract syntax tree.
//!
//! Every node owns its children.  `Clone` is a structural deep copy: cloning a
//! `Block` into a function value produces a tree that shares nothing with the
//! original.

use std::fmt;

use crate::token::Token;

pub type Identifier = String;

/// Root of a parsed source.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A braced statement sequence.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Parameter {
    pub name: Identifier,
    pub mutable: bool,
}

impl Parameter {
    pub fn new(name: &str, mutable: bool) -> Parameter {
        Parameter {
            name: name.to_string(),
            mutable,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDeclaration {
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfStatement {
    pub condition: Expr,
    pub then_branch: Block,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ElseBranch {
    Block(Block),
    If(Box<IfStatement>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    FunctionDeclaration(FunctionDeclaration),
    VariableDeclaration {
        name: Identifier,
        mutable: bool,
        value: Expr,
    },
    While {
        condition: Expr,
        body: Block,
    },
    If(IfStatement),
    Return(Option<Expr>),
    Expression(Expr),
    Null,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Assignment {
        target: Identifier,
        value: Box<Expr>,
    },
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Comparison(ComparisonOp, Box<Expr>, Box<Expr>),
    Relational(RelationalOp, Box<Expr>, Box<Expr>),
    Additive(AdditiveOp, Box<Expr>, Box<Expr>),
    Multiplicative(MultiplicativeOp, Box<Expr>, Box<Expr>),
    Composite(Box<Expr>, Box<Expr>),
    Cast(Box<Expr>, TypeSpecifier),
    Prefix(PrefixOp, Box<Expr>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Debug {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Lambda {
        params: Vec<Parameter>,
        body: Block,
    },
    Identifier(Identifier),
    Parent(Box<Expr>),
    Literal(Literal),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Integer(i32),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// Target of a cast expression.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TypeSpecifier {
    Int,
    Float,
    Str,
    Bool,
}

impl TypeSpecifier {
    pub fn from_token(token: &Token) -> Option<TypeSpecifier> {
        match token {
            Token::IntType => Some(TypeSpecifier::Int),
            Token::FloatType => Some(TypeSpecifier::Float),
            Token::StrType => Some(TypeSpecifier::Str),
            Token::BoolType => Some(TypeSpecifier::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for TypeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpecifier::Int => write!(f, "int"),
            TypeSpecifier::Float => write!(f, "float"),
            TypeSpecifier::Str => write!(f, "str"),
            TypeSpecifier::Bool => write!(f, "bool"),
        }
    }
}

// Operator tags.  Each level of the precedence ladder has its own set so a
// node can only carry an operator that belongs to it.

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RelationalOp {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AdditiveOp {
    Add,
    Sub,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MultiplicativeOp {
    Mul,
    Div,
    Rem,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PrefixOp {
    Neg,
    Not,
}

impl ComparisonOp {
    pub fn from_token(token: &Token) -> Option<ComparisonOp> {
        match token {
            Token::EqualEqual => Some(ComparisonOp::Equal),
            Token::BangEqual => Some(ComparisonOp::NotEqual),
            _ => None,
        }
    }
}

impl RelationalOp {
    pub fn from_token(token: &Token) -> Option<RelationalOp> {
        match token {
            Token::Less => Some(RelationalOp::Less),
            Token::Greater => Some(RelationalOp::Greater),
            Token::LessEqual => Some(RelationalOp::LessEqual),
            Token::GreaterEqual => Some(RelationalOp::GreaterEqual),
            _ => None,
        }
    }
}

impl AdditiveOp {
    pub fn from_token(token: &Token) -> Option<AdditiveOp> {
        match token {
            Token::Plus => Some(AdditiveOp::Add),
            Token::Minus => Some(AdditiveOp::Sub),
            _ => None,
        }
    }
}

impl MultiplicativeOp {
    pub fn from_token(token: &Token) -> Option<MultiplicativeOp> {
        match token {
            Token::Star => Some(MultiplicativeOp::Mul),
            Token::Slash => Some(MultiplicativeOp::Div),
            Token::Percent => Some(MultiplicativeOp::Rem),
            _ => None,
        }
    }
}

impl PrefixOp {
    pub fn from_token(token: &Token) -> Option<PrefixOp> {
        match token {
            Token::Minus => Some(PrefixOp::Neg),
            Token::Bang => Some(PrefixOp::Not),
            _ => None,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOp::Equal => write!(f, "=="),
            ComparisonOp::NotEqual => write!(f, "!="),
        }
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationalOp::Less => write!(f, "<"),
            RelationalOp::Greater => write!(f, ">"),
            RelationalOp::LessEqual => write!(f, "<="),
            RelationalOp::GreaterEqual => write!(f, ">="),
        }
    }
}

impl fmt::Display for AdditiveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdditiveOp::Add => write!(f, "+"),
            AdditiveOp::Sub => write!(f, "-"),
        }
    }
}

impl fmt::Display for MultiplicativeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiplicativeOp::Mul => write!(f, "*"),
            MultiplicativeOp::Div => write!(f, "/"),
            MultiplicativeOp::Rem => write!(f, "%"),
        }
    }
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Neg => write!(f, "-"),
            PrefixOp::Not => write!(f, "!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_is_independent_of_original() {
        let original = Block {
            statements: vec![Stmt::Return(Some(Expr::Identifier("a".to_string())))],
        };
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.statements.push(Stmt::Null);
        if let Stmt::Return(Some(Expr::Identifier(name))) = &mut copy.statements[0] {
            name.push('b');
        }
        assert_eq!(original.statements.len(), 1);
        assert_eq!(
            original.statements[0],
            Stmt::Return(Some(Expr::Identifier("a".to_string())))
        );
    }

    #[test]
    fn operators_map_from_their_level_only() {
        assert_eq!(AdditiveOp::from_token(&Token::Minus), Some(AdditiveOp::Sub));
        assert_eq!(MultiplicativeOp::from_token(&Token::Minus), None);
        assert_eq!(PrefixOp::from_token(&Token::Minus), Some(PrefixOp::Neg));
        assert_eq!(RelationalOp::from_token(&Token::Arrow), None);
        assert_eq!(TypeSpecifier::from_token(&Token::StrType), Some(TypeSpecifier::Str));
    }
}
