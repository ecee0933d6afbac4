//! Textual dump of the syntax tree.
//!
//! One node per line, children indented by two spaces below their parent:
//!
//! ```text
//! Program
//!   ExpressionStatement
//!     AdditiveExpression +
//!       Literal 1
//!       Literal 2
//! ```

use crate::ast::{Block, ElseBranch, Expr, IfStatement, Literal, Parameter, Program, Stmt};
use crate::visitor::Visitor;

#[derive(Debug, Default)]
pub struct AstPrinter {
    out: String,
    depth: usize,
}

impl AstPrinter {
    pub fn new() -> AstPrinter {
        AstPrinter::default()
    }

    pub fn print(program: &Program) -> String {
        let mut printer = AstPrinter::new();
        program.accept(&mut printer);
        printer.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Writes `label` then whatever `children` writes one level deeper.
    fn node(&mut self, label: &str, children: impl FnOnce(&mut Self)) {
        self.line(label);
        self.depth += 1;
        children(self);
        self.depth -= 1;
    }

    fn statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            stmt.accept(self);
        }
    }

    fn parameters(&mut self, params: &[Parameter]) {
        self.node("DeclarationArguments", |p| {
            for param in params {
                if param.mutable {
                    p.line(&format!("Parameter mut {}", param.name));
                } else {
                    p.line(&format!("Parameter {}", param.name));
                }
            }
        });
    }

    fn call(&mut self, label: &str, callee: &Expr, args: &[Expr]) {
        self.node(label, |p| {
            callee.accept(p);
            p.node("CallArguments", |p| {
                for arg in args {
                    arg.accept(p);
                }
            });
        });
    }

    fn binary(&mut self, label: &str, lhs: &Expr, rhs: &Expr) {
        self.node(label, |p| {
            lhs.accept(p);
            rhs.accept(p);
        });
    }

    fn if_statement(&mut self, stmt: &IfStatement) {
        self.node("IfStatement", |p| {
            stmt.condition.accept(p);
            stmt.then_branch.accept(p);
            match &stmt.else_branch {
                Some(ElseBranch::Block(block)) => block.accept(p),
                Some(ElseBranch::If(nested)) => p.if_statement(nested),
                None => (),
            }
        });
    }
}

impl Visitor for AstPrinter {
    type StmtOutput = ();
    type ExprOutput = ();

    fn visit_program(&mut self, program: &Program) {
        self.node("Program", |p| p.statements(&program.statements));
    }

    fn visit_block(&mut self, block: &Block) {
        self.node("Block", |p| p.statements(&block.statements));
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDeclaration(decl) => {
                self.node(&format!("FunctionDeclaration {}", decl.name), |p| {
                    p.parameters(&decl.params);
                    decl.body.accept(p);
                });
            }
            Stmt::VariableDeclaration {
                name,
                mutable,
                value,
            } => {
                let label = if *mutable {
                    format!("VariableDeclaration mut {}", name)
                } else {
                    format!("VariableDeclaration {}", name)
                };
                self.node(&label, |p| value.accept(p));
            }
            Stmt::While { condition, body } => {
                self.node("WhileLoopStatement", |p| {
                    condition.accept(p);
                    body.accept(p);
                });
            }
            Stmt::If(stmt) => self.if_statement(stmt),
            Stmt::Return(value) => {
                self.node("ReturnStatement", |p| {
                    if let Some(e) = value {
                        e.accept(p);
                    }
                });
            }
            Stmt::Expression(e) => self.node("ExpressionStatement", |p| e.accept(p)),
            Stmt::Null => self.line("NullStatement"),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Assignment { target, value } => {
                self.node(&format!("AssignmentExpression {}", target), |p| value.accept(p));
            }
            Expr::Or(lhs, rhs) => self.binary("OrExpression", lhs, rhs),
            Expr::And(lhs, rhs) => self.binary("AndExpression", lhs, rhs),
            Expr::Comparison(op, lhs, rhs) => {
                self.binary(&format!("ComparisonExpression {}", op), lhs, rhs)
            }
            Expr::Relational(op, lhs, rhs) => {
                self.binary(&format!("RelationalExpression {}", op), lhs, rhs)
            }
            Expr::Additive(op, lhs, rhs) => {
                self.binary(&format!("AdditiveExpression {}", op), lhs, rhs)
            }
            Expr::Multiplicative(op, lhs, rhs) => {
                self.binary(&format!("MultiplicativeExpression {}", op), lhs, rhs)
            }
            Expr::Composite(lhs, rhs) => self.binary("CompositiveExpression", lhs, rhs),
            Expr::Cast(operand, target) => {
                self.node("CastExpression", |p| {
                    operand.accept(p);
                    p.line(&format!("TypeSpecifier {}", target));
                });
            }
            Expr::Prefix(op, operand) => {
                self.node(&format!("PrefixExpression {}", op), |p| operand.accept(p));
            }
            Expr::Call { callee, args } => self.call("CallExpression", callee, args),
            Expr::Debug { callee, args } => self.call("DebugExpression", callee, args),
            Expr::Lambda { params, body } => {
                self.node("LambdaExpression", |p| {
                    p.parameters(params);
                    body.accept(p);
                });
            }
            Expr::Identifier(name) => self.line(&format!("Identifier {}", name)),
            Expr::Parent(inner) => self.node("ParentExpression", |p| inner.accept(p)),
            Expr::Literal(lit) => {
                let text = match lit {
                    Literal::Integer(n) => format!("Literal {}", n),
                    Literal::Float(n) => format!("Literal {:?}", n),
                    Literal::Str(s) => format!("Literal {:?}", s),
                    Literal::Bool(b) => format!("Literal {}", b),
                };
                self.line(&text);
            }
        }
    }
}

impl Program {
    /// Renders the tree with [`AstPrinter`].
    pub fn dump(&self) -> String {
        AstPrinter::print(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseError, Parser};
    use pretty_assertions::assert_eq;

    fn dump(src: &str) -> Result<String, ParseError> {
        Ok(Parser::new(src.as_bytes()).parse()?.dump())
    }

    #[test]
    fn precedence_is_visible() -> Result<(), ParseError> {
        assert_eq!(
            dump("1+2*3;")?,
            "\
Program
  ExpressionStatement
    AdditiveExpression +
      Literal 1
      MultiplicativeExpression *
        Literal 2
        Literal 3
"
        );
        Ok(())
    }

    #[test]
    fn declarations() -> Result<(), ParseError> {
        assert_eq!(
            dump("fn f(mut a, b) { return a; } let mut s = \"x\"; ;")?,
            "\
Program
  FunctionDeclaration f
    DeclarationArguments
      Parameter mut a
      Parameter b
    Block
      ReturnStatement
        Identifier a
  VariableDeclaration mut s
    Literal \"x\"
  NullStatement
"
        );
        Ok(())
    }

    #[test]
    fn calls_casts_and_control_flow() -> Result<(), ParseError> {
        assert_eq!(
            dump("while (!b) { [f](1.0 <- int); } if (x == 1) { } else if (y) { } else { $x = -2; }")?,
            "\
Program
  WhileLoopStatement
    PrefixExpression !
      Identifier b
    Block
      ExpressionStatement
        DebugExpression
          Identifier f
          CallArguments
            CastExpression
              Literal 1.0
              TypeSpecifier int
  IfStatement
    ComparisonExpression ==
      Identifier x
      Literal 1
    Block
    IfStatement
      Identifier y
      Block
      Block
        ExpressionStatement
          AssignmentExpression x
            PrefixExpression -
              Literal 2
"
        );
        Ok(())
    }

    #[test]
    fn lambda_and_composition() -> Result<(), ParseError> {
        assert_eq!(
            dump("(#(a) { } | g)(3);")?,
            "\
Program
  ExpressionStatement
    CallExpression
      ParentExpression
        CompositiveExpression
          LambdaExpression
            DeclarationArguments
              Parameter a
            Block
          Identifier g
      CallArguments
        Literal 3
"
        );
        Ok(())
    }
}
