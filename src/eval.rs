//! Tree-walking evaluator.

use std::io;
use std::io::prelude::*;

use thiserror::Error;
use tracing::debug;

use crate::ast::{
    Block, ElseBranch, Expr, IfStatement, Literal, Parameter, PrefixOp, Program, Stmt,
    TypeSpecifier,
};
use crate::context::{AssignError, Context};
use crate::operators;
use crate::value::{Builtin, Function, FunctionBody, Value};
use crate::visitor::Visitor;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid operation: {lhs} {op} {rhs}")]
    InvalidOperation {
        op: String,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("invalid operation: {op}{operand}")]
    InvalidPrefix { op: PrefixOp, operand: &'static str },

    #[error("{statement} condition must be bool, found {found}")]
    ExpectedBool {
        statement: &'static str,
        found: &'static str,
    },

    #[error("{0} value is not callable")]
    NotCallable(&'static str),

    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("cannot compose functions taking {left} and {right} parameters")]
    CompositionArity { left: usize, right: usize },

    #[error("unbound variable: {0}")]
    UnboundVariable(String),

    #[error("cannot assign twice to immutable variable: {0}")]
    ImmutableAssignment(String),

    #[error("variable already declared in this scope: {0}")]
    Redeclaration(String),

    #[error("integer overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("call depth exceeded {max}")]
    RecursionLimit { max: usize },

    #[error("cannot cast {from} to {to}")]
    InvalidCast {
        from: &'static str,
        to: TypeSpecifier,
    },

    #[error("cannot cast {text:?} to {target}")]
    MalformedCastSource { text: String, target: TypeSpecifier },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// How a statement finished.
#[derive(Debug, PartialEq, Clone)]
pub enum Flow {
    /// Fell through, carrying the statement's value.
    Normal(Value),
    /// A `return` is unwinding to the enclosing call.
    Return(Value),
}

impl Flow {
    pub fn into_value(self) -> Value {
        match self {
            Flow::Normal(v) | Flow::Return(v) => v,
        }
    }

    /// Result of a function body: only an explicit `return` yields a value.
    fn returned(self) -> Value {
        match self {
            Flow::Normal(_) => Value::Unit,
            Flow::Return(v) => v,
        }
    }
}

/// Default bound on nested function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Evaluates programs, writing `print` and debug traces to `output`.
///
/// The scope stack starts with a prelude holding the builtins and a session
/// scope above it.  Both live as long as the evaluator.
#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    context: Context,

    // Calls in progress, composed halves included.
    depth: usize,
    max_depth: usize,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(output: &'a mut W) -> Evaluator<'a, W> {
        Evaluator::with_max_depth(output, DEFAULT_MAX_CALL_DEPTH)
    }

    /// Creates an evaluator failing with `RecursionLimit` once `max_depth` calls are nested.
    pub fn with_max_depth(output: &'a mut W, max_depth: usize) -> Evaluator<'a, W> {
        let mut context = Context::new();
        context.push();
        for builtin in [Builtin::Print] {
            context.declare(builtin.name(), Value::Function(builtin.function()), false);
        }
        context.push();
        Evaluator {
            output,
            context,
            depth: 0,
            max_depth,
        }
    }

    /// Runs `program` in a fresh root scope dropped afterwards.
    pub fn run(&mut self, program: &Program) -> Result<Value, EvalError> {
        program.accept(self).map(Flow::into_value)
    }

    /// Runs `program` directly in the session scope so its bindings are
    /// visible to later runs.
    pub fn run_in_session(&mut self, program: &Program) -> Result<Value, EvalError> {
        self.execute(&program.statements).map(Flow::into_value)
    }

    fn execute(&mut self, statements: &[Stmt]) -> Result<Flow, EvalError> {
        let mut last = Value::Unit;
        for stmt in statements {
            match stmt.accept(self)? {
                Flow::Normal(v) => last = v,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal(last))
    }

    /// Runs `f` in a new innermost scope, popped on every exit path.
    fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.context.push();
        let result = f(self);
        self.context.pop();
        result
    }

    fn declare(&mut self, name: &str, value: Value, mutable: bool) -> Result<(), EvalError> {
        if self.context.declare(name, value, mutable) {
            Ok(())
        } else {
            Err(EvalError::Redeclaration(name.to_string()))
        }
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        self.context.assign(name, value).map_err(|e| match e {
            AssignError::Immutable => EvalError::ImmutableAssignment(name.to_string()),
            AssignError::Undefined => EvalError::UnboundVariable(name.to_string()),
        })
    }

    fn condition(&mut self, expr: &Expr, statement: &'static str) -> Result<bool, EvalError> {
        match expr.accept(self)? {
            Value::Bool(b) => Ok(b),
            v => Err(EvalError::ExpectedBool {
                statement,
                found: v.type_name(),
            }),
        }
    }

    fn if_statement(&mut self, stmt: &IfStatement) -> Result<Flow, EvalError> {
        let flow = if self.condition(&stmt.condition, "if")? {
            stmt.then_branch.accept(self)?
        } else {
            match &stmt.else_branch {
                Some(ElseBranch::Block(block)) => block.accept(self)?,
                Some(ElseBranch::If(nested)) => self.if_statement(nested)?,
                None => Flow::Normal(Value::Unit),
            }
        };
        Ok(match flow {
            Flow::Normal(_) => Flow::Normal(Value::Unit),
            ret => ret,
        })
    }

    /// Evaluates both operands, left first, and applies `op`.
    fn binary(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        op: impl FnOnce(Value, Value) -> Result<Value, EvalError>,
    ) -> Result<Value, EvalError> {
        let l = lhs.accept(self)?;
        let r = rhs.accept(self)?;
        op(l, r)
    }

    fn call(&mut self, callee: &Expr, args: &[Expr], trace: bool) -> Result<Value, EvalError> {
        let function = match callee.accept(self)? {
            Value::Function(f) => f,
            v => return Err(EvalError::NotCallable(v.type_name())),
        };
        let args = args
            .iter()
            .map(|a| a.accept(self))
            .collect::<Result<Vec<Value>, EvalError>>()?;
        self.call_function(&function, args, trace)
    }

    fn call_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
        trace: bool,
    ) -> Result<Value, EvalError> {
        if args.len() != function.arity() {
            return Err(EvalError::ArityMismatch {
                expected: function.arity(),
                found: args.len(),
            });
        }
        if self.depth >= self.max_depth {
            return Err(recursion_limit(self.max_depth));
        }
        self.depth += 1;
        let result = self.enter_function(function, args, trace);
        self.depth -= 1;
        result
    }

    fn enter_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
        trace: bool,
    ) -> Result<Value, EvalError> {
        debug!(arity = function.arity(), depth = self.depth, "calling function");
        if trace {
            self.trace_call(&function.params, &args)?;
        }

        let result = match &function.body {
            FunctionBody::Builtin(builtin) => self.call_builtin(*builtin, &args)?,
            FunctionBody::User(body) => self.call_user(&function.params, body, args)?,
            FunctionBody::Composed(first, second) => {
                let intermediate = self.call_function(first, args, false)?;
                self.call_function(second, vec![intermediate], false)?
            }
        };

        if trace {
            self.trace_return(&result)?;
        }
        Ok(result)
    }

    fn call_user(
        &mut self,
        params: &[Parameter],
        body: &Block,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        self.scoped(|this| {
            for (param, arg) in params.iter().zip(args) {
                this.declare(&param.name, arg, param.mutable)?;
            }
            Ok(this.execute(&body.statements)?.returned())
        })
    }

    fn call_builtin(&mut self, builtin: Builtin, args: &[Value]) -> Result<Value, EvalError> {
        match builtin {
            Builtin::Print => {
                for arg in args {
                    writeln!(self.output, "{}", arg)?;
                }
            }
        }
        Ok(Value::Unit)
    }

    fn trace_call(&mut self, params: &[Parameter], args: &[Value]) -> Result<(), EvalError> {
        let bindings = params
            .iter()
            .zip(args)
            .map(|(p, v)| format!("{} = {}", p.name, v))
            .collect::<Vec<_>>()
            .join(", ");
        debug!(%bindings, "debug call");
        if bindings.is_empty() {
            writeln!(self.output, "[debug] call:")?;
        } else {
            writeln!(self.output, "[debug] call: {}", bindings)?;
        }
        Ok(())
    }

    fn trace_return(&mut self, value: &Value) -> Result<(), EvalError> {
        debug!(%value, "debug return");
        writeln!(self.output, "[debug] return: {}", value)?;
        Ok(())
    }
}

#[cold]
fn recursion_limit(max: usize) -> EvalError {
    EvalError::RecursionLimit { max }
}

impl<W: Write> Visitor for Evaluator<'_, W> {
    type StmtOutput = Result<Flow, EvalError>;
    type ExprOutput = Result<Value, EvalError>;

    fn visit_program(&mut self, program: &Program) -> Result<Flow, EvalError> {
        let flow = self.scoped(|this| this.execute(&program.statements))?;
        Ok(Flow::Normal(flow.into_value()))
    }

    fn visit_block(&mut self, block: &Block) -> Result<Flow, EvalError> {
        self.scoped(|this| this.execute(&block.statements))
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<Flow, EvalError> {
        match stmt {
            Stmt::FunctionDeclaration(decl) => {
                let function = Function::user(&decl.params, &decl.body);
                self.declare(&decl.name, Value::Function(function), false)?;
            }
            Stmt::VariableDeclaration {
                name,
                mutable,
                value,
            } => {
                let value = value.accept(self)?;
                self.declare(name, value, *mutable)?;
            }
            Stmt::While { condition, body } => {
                while self.condition(condition, "while")? {
                    if let Flow::Return(v) = body.accept(self)? {
                        return Ok(Flow::Return(v));
                    }
                }
            }
            Stmt::If(stmt) => return self.if_statement(stmt),
            Stmt::Return(value) => {
                let value = match value {
                    Some(e) => e.accept(self)?,
                    None => Value::Unit,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Expression(e) => return Ok(Flow::Normal(e.accept(self)?)),
            Stmt::Null => (),
        }
        Ok(Flow::Normal(Value::Unit))
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Assignment { target, value } => {
                let value = value.accept(self)?;
                self.assign(target, value.clone())?;
                Ok(value)
            }
            // Both operands are always evaluated.
            Expr::Or(lhs, rhs) => self.binary(lhs, rhs, operators::or),
            Expr::And(lhs, rhs) => self.binary(lhs, rhs, operators::and),
            Expr::Comparison(op, lhs, rhs) => {
                self.binary(lhs, rhs, |l, r| operators::comparison(*op, l, r))
            }
            Expr::Relational(op, lhs, rhs) => {
                self.binary(lhs, rhs, |l, r| operators::relational(*op, l, r))
            }
            Expr::Additive(op, lhs, rhs) => {
                self.binary(lhs, rhs, |l, r| operators::additive(*op, l, r))
            }
            Expr::Multiplicative(op, lhs, rhs) => {
                self.binary(lhs, rhs, |l, r| operators::multiplicative(*op, l, r))
            }
            Expr::Composite(lhs, rhs) => self.binary(lhs, rhs, operators::compose),
            Expr::Cast(operand, target) => operand.accept(self)?.cast(*target),
            Expr::Prefix(op, operand) => operators::prefix(*op, operand.accept(self)?),
            Expr::Call { callee, args } => self.call(callee, args, false),
            Expr::Debug { callee, args } => self.call(callee, args, true),
            Expr::Lambda { params, body } => Ok(Value::Function(Function::user(params, body))),
            Expr::Identifier(name) => self
                .context
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable(name.clone())),
            Expr::Parent(inner) => inner.accept(self),
            Expr::Literal(lit) => Ok(match lit {
                Literal::Integer(n) => Value::Integer(*n),
                Literal::Float(n) => Value::Float(*n),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
            }),
        }
    }
}
