//! Recursive descent parser.
//!
//! Precedence, lowest first:
//!
//! ```text
//! expression     := '$' IDENT '=' expression | or ('=' expression)?
//! or             := and ('||' and)*
//! and            := comparison ('&&' comparison)*
//! comparison     := relational (('==' | '!=') relational)*
//! relational     := additive (('<' | '>' | '<=' | '>=') additive)*
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := composite (('*' | '/' | '%') composite)*
//! composite      := cast ('|' cast)*
//! cast           := prefix ('<-' type)?
//! prefix         := ('-' | '!')? primary
//! primary        := IDENT call? | '(' expression ')' call? | '#' lambda call?
//!                 | '[' expression ']' call | literal
//! ```
//!
//! The parser does not recover: the first mismatch aborts the whole parse.

use std::io::prelude::*;

use thiserror::Error;
use tracing::debug;

use crate::ast::{
    AdditiveOp, Block, ComparisonOp, ElseBranch, Expr, FunctionDeclaration, Identifier,
    IfStatement, Literal, MultiplicativeOp, Parameter, PrefixOp, Program, RelationalOp, Stmt,
    TypeSpecifier,
};
use crate::diag::{Position, SyntaxErrorKind};
use crate::lexer::{LexError, Lexer, Limits};
use crate::token::Token;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("parse error: {pos}: {kind}")]
    Syntax { pos: Position, kind: SyntaxErrorKind },
}

impl ParseError {
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::Syntax { pos, .. } => Some(*pos),
        }
    }
}

#[derive(Debug)]
pub struct Parser<R: BufRead> {
    lexer: Lexer<R>,
    current_token: Token,
    current_pos: Position,

    // Expressions, blocks and `else if` branches currently open.
    depth: usize,
    max_depth: usize,
}

impl<R: BufRead> Parser<R> {
    pub fn new(input: R) -> Parser<R> {
        Parser::with_limits(input, Limits::default())
    }

    pub fn with_limits(input: R, limits: Limits) -> Parser<R> {
        Parser {
            lexer: Lexer::with_limits(input, limits),
            current_token: Token::EndOfFile, // we haven't scanned anything yet
            current_pos: Position::new(1, 1),
            depth: 0,
            max_depth: limits.nesting,
        }
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        self.advance()?;
        let mut statements = vec![];
        while self.current_token != Token::EndOfFile {
            statements.push(self.statement()?);
        }
        debug!(statements = statements.len(), "parsed program");
        Ok(Program { statements })
    }

    /// Parses input consisting of exactly one expression.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.advance()?;
        let expr = self.expression()?;
        self.consume(Token::EndOfFile)?;
        Ok(expr)
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current_token {
            Token::Let => self.variable_declaration(),
            Token::Fn => self.function_declaration(),
            Token::While => self.while_statement(),
            Token::If => Ok(Stmt::If(self.if_statement()?)),
            Token::Return => self.return_statement(),
            Token::Semicolon => {
                self.advance()?;
                Ok(Stmt::Null)
            }
            _ => {
                let expr = self.expression()?;
                self.consume(Token::Semicolon)?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    /// Current token is `Token::Let`.
    fn variable_declaration(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?;
        let mutable = self.mutability()?;
        let name = self.identifier()?;
        self.consume(Token::Assign)?;
        let value = self.expression()?;
        self.consume(Token::Semicolon)?;
        Ok(Stmt::VariableDeclaration {
            name,
            mutable,
            value,
        })
    }

    fn function_declaration(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?;
        let name = self.identifier()?;
        let params = self.parameters()?;
        let body = self.block()?;
        Ok(Stmt::FunctionDeclaration(FunctionDeclaration {
            name,
            params,
            body,
        }))
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?;
        let condition = self.predicate("while")?;
        let body = self.block()?;
        Ok(Stmt::While { condition, body })
    }

    fn if_statement(&mut self) -> Result<IfStatement, ParseError> {
        self.nested(Self::if_statement_body)
    }

    fn if_statement_body(&mut self) -> Result<IfStatement, ParseError> {
        self.advance()?;
        let condition = self.predicate("if")?;
        let then_branch = self.block()?;
        let else_branch = if self.current_token == Token::Else {
            self.advance()?;
            match self.current_token {
                Token::If => Some(ElseBranch::If(Box::new(self.if_statement()?))),
                Token::LeftCurly => Some(ElseBranch::Block(self.block()?)),
                _ => return self.unexpected("'{' or 'if'"),
            }
        } else {
            None
        };
        Ok(IfStatement {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?;
        let value = if self.current_token == Token::Semicolon {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(Token::Semicolon)?;
        Ok(Stmt::Return(value))
    }

    /// Parenthesized condition of an `if` or `while`.
    fn predicate(&mut self, statement: &'static str) -> Result<Expr, ParseError> {
        self.consume(Token::LeftParen)?;
        if !self.starts_expression() {
            return self.error(SyntaxErrorKind::ExpectedPredicate { statement });
        }
        let condition = self.expression()?;
        self.consume(Token::RightParen)?;
        Ok(condition)
    }

    fn block(&mut self) -> Result<Block, ParseError> {
        self.nested(Self::block_body)
    }

    fn block_body(&mut self) -> Result<Block, ParseError> {
        self.consume(Token::LeftCurly)?;
        let mut statements = vec![];
        loop {
            match self.current_token {
                Token::RightCurly => {
                    self.advance()?;
                    break;
                }
                Token::EndOfFile => return self.unexpected("'}'"),
                _ => statements.push(self.statement()?),
            }
        }
        Ok(Block { statements })
    }

    fn parameters(&mut self) -> Result<Vec<Parameter>, ParseError> {
        self.consume(Token::LeftParen)?;
        let mut params = vec![];
        if self.current_token != Token::RightParen {
            loop {
                let mutable = self.mutability()?;
                let pos = self.current_pos;
                let param = self.parameter(mutable)?;
                if params.iter().any(|p: &Parameter| p.name == param.name) {
                    return Err(ParseError::Syntax {
                        pos,
                        kind: SyntaxErrorKind::DuplicateParameter { name: param.name },
                    });
                }
                params.push(param);
                if self.current_token != Token::Comma {
                    break;
                }
                self.advance()?;
            }
        }
        self.consume(Token::RightParen)?;
        Ok(params)
    }

    fn parameter(&mut self, mutable: bool) -> Result<Parameter, ParseError> {
        if let Token::Identifier(name) = &self.current_token {
            let param = Parameter {
                name: name.clone(),
                mutable,
            };
            self.advance()?;
            Ok(param)
        } else {
            self.error(SyntaxErrorKind::ExpectedParameter {
                found: self.current_token.describe(),
            })
        }
    }

    /// Consumes an optional `mut`.
    fn mutability(&mut self) -> Result<bool, ParseError> {
        if self.current_token == Token::Mut {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn identifier(&mut self) -> Result<Identifier, ParseError> {
        if let Token::Identifier(name) = &self.current_token {
            let name = name.clone();
            self.advance()?;
            Ok(name)
        } else {
            self.unexpected("identifier")
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::expression_body)
    }

    fn expression_body(&mut self) -> Result<Expr, ParseError> {
        if self.current_token == Token::Dollar {
            self.advance()?;
            let target = self.identifier()?;
            self.consume(Token::Assign)?;
            return self.assignment(target);
        }

        let lhs = self.or()?;
        if self.current_token != Token::Assign {
            return Ok(lhs);
        }
        if let Expr::Identifier(target) = lhs {
            self.advance()?;
            self.assignment(target)
        } else {
            self.error(SyntaxErrorKind::ExpectedLvalue)
        }
    }

    /// Current token is the first one after `=`.
    fn assignment(&mut self, target: Identifier) -> Result<Expr, ParseError> {
        let value = self.expression()?;
        Ok(Expr::Assignment {
            target,
            value: Box::new(value),
        })
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.current_token == Token::OrOr {
            self.advance()?;
            expr = Expr::Or(Box::new(expr), Box::new(self.and()?));
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        while self.current_token == Token::AndAnd {
            self.advance()?;
            expr = Expr::And(Box::new(expr), Box::new(self.comparison()?));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.relational()?;
        while let Some(op) = ComparisonOp::from_token(&self.current_token) {
            self.advance()?;
            expr = Expr::Comparison(op, Box::new(expr), Box::new(self.relational()?));
        }
        Ok(expr)
    }

    fn relational(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.additive()?;
        while let Some(op) = RelationalOp::from_token(&self.current_token) {
            self.advance()?;
            expr = Expr::Relational(op, Box::new(expr), Box::new(self.additive()?));
        }
        Ok(expr)
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.multiplicative()?;
        while let Some(op) = AdditiveOp::from_token(&self.current_token) {
            self.advance()?;
            expr = Expr::Additive(op, Box::new(expr), Box::new(self.multiplicative()?));
        }
        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.composite()?;
        while let Some(op) = MultiplicativeOp::from_token(&self.current_token) {
            self.advance()?;
            expr = Expr::Multiplicative(op, Box::new(expr), Box::new(self.composite()?));
        }
        Ok(expr)
    }

    fn composite(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.cast()?;
        while self.current_token == Token::Pipe {
            self.advance()?;
            expr = Expr::Composite(Box::new(expr), Box::new(self.cast()?));
        }
        Ok(expr)
    }

    fn cast(&mut self) -> Result<Expr, ParseError> {
        let expr = self.prefix()?;
        if self.current_token != Token::Arrow {
            return Ok(expr);
        }
        self.advance()?;
        let Some(ty) = TypeSpecifier::from_token(&self.current_token) else {
            return self.error(SyntaxErrorKind::ExpectedType {
                found: self.current_token.describe(),
            });
        };
        self.advance()?;
        Ok(Expr::Cast(Box::new(expr), ty))
    }

    fn prefix(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = PrefixOp::from_token(&self.current_token) {
            self.advance()?;
            Ok(Expr::Prefix(op, Box::new(self.primary()?)))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let literal = match &self.current_token {
            Token::Integer(n) => Some(Literal::Integer(*n)),
            Token::Float(n) => Some(Literal::Float(*n)),
            Token::Str(s) => Some(Literal::Str(s.clone())),
            Token::True => Some(Literal::Bool(true)),
            Token::False => Some(Literal::Bool(false)),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance()?;
            return Ok(Expr::Literal(literal));
        }

        let callee = match &self.current_token {
            Token::Identifier(name) => {
                let expr = Expr::Identifier(name.clone());
                self.advance()?;
                expr
            }
            Token::LeftParen => {
                self.advance()?;
                let expr = self.expression()?;
                self.consume(Token::RightParen)?;
                Expr::Parent(Box::new(expr))
            }
            Token::Hash => {
                self.advance()?;
                let params = self.parameters()?;
                let body = self.block()?;
                Expr::Lambda { params, body }
            }
            Token::LeftBracket => {
                self.advance()?;
                let callee = self.expression()?;
                self.consume(Token::RightBracket)?;
                let args = self.call_arguments()?;
                return Ok(Expr::Debug {
                    callee: Box::new(callee),
                    args,
                });
            }
            t => {
                return self.error(SyntaxErrorKind::ExpectedExpression {
                    found: t.describe(),
                })
            }
        };

        if self.current_token == Token::LeftParen {
            let args = self.call_arguments()?;
            Ok(Expr::Call {
                callee: Box::new(callee),
                args,
            })
        } else {
            Ok(callee)
        }
    }

    fn call_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.consume(Token::LeftParen)?;
        let mut args = vec![];
        if self.current_token != Token::RightParen {
            loop {
                args.push(self.expression()?);
                if self.current_token != Token::Comma {
                    break;
                }
                self.advance()?;
            }
        }
        self.consume(Token::RightParen)?;
        Ok(args)
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.current_token,
            Token::Identifier(_)
                | Token::Integer(_)
                | Token::Float(_)
                | Token::Str(_)
                | Token::True
                | Token::False
                | Token::LeftParen
                | Token::LeftBracket
                | Token::Hash
                | Token::Minus
                | Token::Bang
                | Token::Dollar
        )
    }

    /// Runs `f` one nesting level deeper, failing at the current token once the bound is hit.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.max_depth {
            return self.error(SyntaxErrorKind::NestingTooDeep {
                max: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let lexem = self.lexer.next_lexem()?;
        self.current_pos = lexem.position();
        self.current_token = lexem.token;
        Ok(())
    }

    fn consume(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current_token == expected {
            self.advance()
        } else {
            self.unexpected(&expected.describe())
        }
    }

    fn unexpected<T>(&self, expected: &str) -> Result<T, ParseError> {
        self.error(SyntaxErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current_token.describe(),
        })
    }

    fn error<T>(&self, kind: SyntaxErrorKind) -> Result<T, ParseError> {
        Err(ParseError::Syntax {
            pos: self.current_pos,
            kind,
        })
    }
}
