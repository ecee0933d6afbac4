//! Double dispatch over the syntax tree.
//!
//! A tree consumer implements `Visitor` and matches exhaustively on `Stmt` and
//! `Expr` in its handlers.  Handlers only get shared references so the tree
//! cannot be modified while it is walked.

use crate::ast::{Block, Expr, Program, Stmt};

pub trait Visitor {
    /// Result of visiting a program, block or statement.
    type StmtOutput;
    /// Result of visiting an expression.
    type ExprOutput;

    fn visit_program(&mut self, program: &Program) -> Self::StmtOutput;
    fn visit_block(&mut self, block: &Block) -> Self::StmtOutput;
    fn visit_stmt(&mut self, stmt: &Stmt) -> Self::StmtOutput;
    fn visit_expr(&mut self, expr: &Expr) -> Self::ExprOutput;
}

impl Program {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::StmtOutput {
        visitor.visit_program(self)
    }
}

impl Block {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::StmtOutput {
        visitor.visit_block(self)
    }
}

impl Stmt {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::StmtOutput {
        visitor.visit_stmt(self)
    }
}

impl Expr {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::ExprOutput {
        visitor.visit_expr(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    /// Counts integer literals, descending only into what it needs.
    struct IntegerCounter(usize);

    impl Visitor for IntegerCounter {
        type StmtOutput = ();
        type ExprOutput = ();

        fn visit_program(&mut self, program: &Program) {
            program.statements.iter().for_each(|s| s.accept(self));
        }

        fn visit_block(&mut self, block: &Block) {
            block.statements.iter().for_each(|s| s.accept(self));
        }

        fn visit_stmt(&mut self, stmt: &Stmt) {
            if let Stmt::Expression(e) = stmt {
                e.accept(self);
            }
        }

        fn visit_expr(&mut self, expr: &Expr) {
            match expr {
                Expr::Literal(Literal::Integer(_)) => self.0 += 1,
                Expr::Parent(inner) => inner.accept(self),
                _ => (),
            }
        }
    }

    #[test]
    fn accept_dispatches_to_matching_handler() {
        let program = Program {
            statements: vec![
                Stmt::Expression(Expr::Literal(Literal::Integer(1))),
                Stmt::Null,
                Stmt::Expression(Expr::Parent(Box::new(Expr::Literal(Literal::Integer(2))))),
            ],
        };
        let mut counter = IntegerCounter(0);
        program.accept(&mut counter);
        assert_eq!(counter.0, 2);
    }
}
