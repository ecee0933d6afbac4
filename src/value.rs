//! Runtime values.

use std::fmt;

use crate::ast::{Block, Parameter, TypeSpecifier};
use crate::eval::EvalError;

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Unit,
    Integer(i32),
    Float(f64),
    Str(String),
    Bool(bool),
    Function(Function),
}

/// A function value.
///
/// User functions own a copy of their declaration body, so copying a function
/// value copies its tree and two bindings never share one.
#[derive(Debug, PartialEq, Clone)]
pub struct Function {
    pub params: Vec<Parameter>,
    pub body: FunctionBody,
}

#[derive(Debug, PartialEq, Clone)]
pub enum FunctionBody {
    User(Block),
    Builtin(Builtin),
    /// `first | second`: the result of `first` is fed to `second`.
    Composed(Box<Function>, Box<Function>),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Builtin {
    Print,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
        }
    }

    pub fn function(self) -> Function {
        let params = match self {
            Builtin::Print => vec![Parameter::new("value", false)],
        };
        Function {
            params,
            body: FunctionBody::Builtin(self),
        }
    }
}

impl Function {
    pub fn user(params: &[Parameter], body: &Block) -> Function {
        Function {
            params: params.to_vec(),
            body: FunctionBody::User(body.clone()),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Function(_) => "function",
        }
    }

    /// Explicit conversion to `target`.
    pub fn cast(self, target: TypeSpecifier) -> Result<Value, EvalError> {
        let converted = match (self, target) {
            (Value::Integer(n), TypeSpecifier::Str) => Value::Str(n.to_string()),
            (Value::Integer(n), TypeSpecifier::Float) => Value::Float(f64::from(n)),
            (Value::Integer(n), TypeSpecifier::Bool) => Value::Bool(n != 0),

            (Value::Float(n), TypeSpecifier::Int) => Value::Integer(truncate(n)?),
            (Value::Float(n), TypeSpecifier::Str) => Value::Str(n.to_string()),
            (Value::Float(n), TypeSpecifier::Bool) => Value::Bool(n != 0.0),

            (Value::Bool(b), TypeSpecifier::Int) => Value::Integer(i32::from(b)),
            (Value::Bool(b), TypeSpecifier::Float) => Value::Float(if b { 1.0 } else { 0.0 }),

            (Value::Str(s), TypeSpecifier::Str) => Value::Str(s),
            (Value::Str(s), TypeSpecifier::Int) => match s.parse::<i32>() {
                Ok(n) => Value::Integer(n),
                Err(_) => return Err(EvalError::MalformedCastSource { text: s, target }),
            },
            (Value::Str(s), TypeSpecifier::Float) => match s.parse::<f64>() {
                Ok(n) => Value::Float(n),
                Err(_) => return Err(EvalError::MalformedCastSource { text: s, target }),
            },

            (v, target) => {
                return Err(EvalError::InvalidCast {
                    from: v.type_name(),
                    to: target,
                })
            }
        };
        Ok(converted)
    }
}

/// Truncates toward zero, rejecting values outside the 32-bit range.
fn truncate(n: f64) -> Result<i32, EvalError> {
    let t = n.trunc();
    if t.is_nan() || t < f64::from(i32::MIN) || t > f64::from(i32::MAX) {
        return Err(EvalError::Overflow);
    }
    // In range and integral, so the conversion is exact.
    Ok(t as i32)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}
