//! Operator semantics.
//!
//! Binary operators are only defined for operands of the same kind.  There is
//! no promotion between `int` and `float`, and every integer operation is
//! checked: overflow is an error, never a wrap.

use std::fmt;

use crate::ast::{AdditiveOp, ComparisonOp, MultiplicativeOp, PrefixOp, RelationalOp};
use crate::eval::EvalError;
use crate::value::{Function, FunctionBody, Value};

#[cold]
fn invalid(op: impl fmt::Display, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::InvalidOperation {
        op: op.to_string(),
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

fn checked(result: Option<i32>) -> Result<Value, EvalError> {
    result.map(Value::Integer).ok_or(EvalError::Overflow)
}

pub fn or(lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (&lhs, &rhs) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),
        _ => Err(invalid("||", &lhs, &rhs)),
    }
}

pub fn and(lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (&lhs, &rhs) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
        _ => Err(invalid("&&", &lhs, &rhs)),
    }
}

pub fn comparison(op: ComparisonOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    let equal = match (&lhs, &rhs) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => return Err(invalid(op, &lhs, &rhs)),
    };
    Ok(Value::Bool(match op {
        ComparisonOp::Equal => equal,
        ComparisonOp::NotEqual => !equal,
    }))
}

fn compare<T: PartialOrd>(op: RelationalOp, a: T, b: T) -> bool {
    match op {
        RelationalOp::Less => a < b,
        RelationalOp::Greater => a > b,
        RelationalOp::LessEqual => a <= b,
        RelationalOp::GreaterEqual => a >= b,
    }
}

pub fn relational(op: RelationalOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (&lhs, &rhs) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Bool(compare(op, a, b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Bool(compare(op, a, b))),
        _ => Err(invalid(op, &lhs, &rhs)),
    }
}

pub fn additive(op: AdditiveOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => checked(match op {
            AdditiveOp::Add => a.checked_add(b),
            AdditiveOp::Sub => a.checked_sub(b),
        }),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(match op {
            AdditiveOp::Add => a + b,
            AdditiveOp::Sub => a - b,
        })),
        (Value::Str(a), Value::Str(b)) if op == AdditiveOp::Add => Ok(Value::Str(a + &b)),
        (lhs, rhs) => Err(invalid(op, &lhs, &rhs)),
    }
}

pub fn multiplicative(op: MultiplicativeOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => match op {
            MultiplicativeOp::Mul => checked(a.checked_mul(b)),
            MultiplicativeOp::Div | MultiplicativeOp::Rem if b == 0 => {
                Err(EvalError::DivisionByZero)
            }
            // Only i32::MIN by -1 is left to overflow.
            MultiplicativeOp::Div => checked(a.checked_div(b)),
            MultiplicativeOp::Rem => checked(a.checked_rem(b)),
        },
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(match op {
            MultiplicativeOp::Mul => a * b,
            MultiplicativeOp::Div => a / b,
            MultiplicativeOp::Rem => a % b,
        })),
        (lhs, rhs) => Err(invalid(op, &lhs, &rhs)),
    }
}

pub fn prefix(op: PrefixOp, operand: Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (PrefixOp::Neg, Value::Integer(n)) => checked(n.checked_neg()),
        (PrefixOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
        (PrefixOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, operand) => Err(EvalError::InvalidPrefix {
            op,
            operand: operand.type_name(),
        }),
    }
}

/// `first | second`: a one-parameter function computing `second(first(x))`.
pub fn compose(lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Function(first), Value::Function(second)) => {
            if first.arity() != 1 || second.arity() != 1 {
                return Err(EvalError::CompositionArity {
                    left: first.arity(),
                    right: second.arity(),
                });
            }
            Ok(Value::Function(Function {
                params: first.params.clone(),
                body: FunctionBody::Composed(Box::new(first), Box::new(second)),
            }))
        }
        (lhs, rhs) => Err(invalid("|", &lhs, &rhs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Builtin;

    #[test]
    fn integer_arithmetic() -> Result<(), EvalError> {
        assert_eq!(
            additive(AdditiveOp::Sub, Value::Integer(1), Value::Integer(3))?,
            Value::Integer(-2)
        );
        assert_eq!(
            multiplicative(MultiplicativeOp::Div, Value::Integer(7), Value::Integer(2))?,
            Value::Integer(3)
        );
        assert_eq!(
            multiplicative(MultiplicativeOp::Rem, Value::Integer(-7), Value::Integer(2))?,
            Value::Integer(-1)
        );
        Ok(())
    }

    #[test]
    fn integer_overflow_is_an_error() {
        match additive(AdditiveOp::Add, Value::Integer(i32::MAX), Value::Integer(1)) {
            Err(EvalError::Overflow) => (),
            r => panic!("unexpected output: {:?}", r),
        }
        match multiplicative(MultiplicativeOp::Div, Value::Integer(i32::MIN), Value::Integer(-1)) {
            Err(EvalError::Overflow) => (),
            r => panic!("unexpected output: {:?}", r),
        }
        match prefix(PrefixOp::Neg, Value::Integer(i32::MIN)) {
            Err(EvalError::Overflow) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn integer_division_by_zero() {
        for op in [MultiplicativeOp::Div, MultiplicativeOp::Rem] {
            match multiplicative(op, Value::Integer(6), Value::Integer(0)) {
                Err(EvalError::DivisionByZero) => (),
                r => panic!("unexpected output: {:?}", r),
            }
        }
    }

    #[test]
    fn float_division_by_zero_is_infinite() -> Result<(), EvalError> {
        assert_eq!(
            multiplicative(MultiplicativeOp::Div, Value::Float(1.0), Value::Float(0.0))?,
            Value::Float(f64::INFINITY)
        );
        Ok(())
    }

    #[test]
    fn string_concatenation() -> Result<(), EvalError> {
        assert_eq!(
            additive(
                AdditiveOp::Add,
                Value::Str("ab".to_string()),
                Value::Str("cd".to_string())
            )?,
            Value::Str("abcd".to_string())
        );
        match additive(
            AdditiveOp::Sub,
            Value::Str("ab".to_string()),
            Value::Str("cd".to_string()),
        ) {
            Err(EvalError::InvalidOperation { op, .. }) if op == "-" => (),
            r => panic!("unexpected output: {:?}", r),
        }
        Ok(())
    }

    #[test]
    fn mixed_kinds_are_rejected() {
        match additive(AdditiveOp::Add, Value::Integer(1), Value::Float(1.0)) {
            Err(EvalError::InvalidOperation { lhs: "int", rhs: "float", .. }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
        match comparison(ComparisonOp::Equal, Value::Bool(true), Value::Integer(1)) {
            Err(EvalError::InvalidOperation { .. }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
        match relational(RelationalOp::Less, Value::Bool(true), Value::Bool(false)) {
            Err(EvalError::InvalidOperation { .. }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
        match and(Value::Integer(1), Value::Bool(true)) {
            Err(EvalError::InvalidOperation { .. }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn comparisons() -> Result<(), EvalError> {
        assert_eq!(
            comparison(ComparisonOp::NotEqual, Value::Float(2.5), Value::Float(5.2))?,
            Value::Bool(true)
        );
        assert_eq!(
            relational(RelationalOp::LessEqual, Value::Integer(2), Value::Integer(2))?,
            Value::Bool(true)
        );
        assert_eq!(
            relational(RelationalOp::Greater, Value::Float(f64::NAN), Value::Float(0.0))?,
            Value::Bool(false)
        );
        Ok(())
    }

    #[test]
    fn logical_operators() -> Result<(), EvalError> {
        assert_eq!(or(Value::Bool(false), Value::Bool(true))?, Value::Bool(true));
        assert_eq!(and(Value::Bool(true), Value::Bool(false))?, Value::Bool(false));
        Ok(())
    }

    #[test]
    fn prefix_on_wrong_kind() {
        match prefix(PrefixOp::Not, Value::Integer(1)) {
            Err(EvalError::InvalidPrefix { op: PrefixOp::Not, operand: "int" }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn composition_requires_unary_functions() {
        let print = Value::Function(Builtin::Print.function());
        match compose(print.clone(), print.clone()) {
            Ok(Value::Function(f)) if f.arity() == 1 => (),
            r => panic!("unexpected output: {:?}", r),
        }

        let binary = Value::Function(Function {
            params: vec![
                crate::ast::Parameter::new("a", false),
                crate::ast::Parameter::new("b", false),
            ],
            body: FunctionBody::User(Default::default()),
        });
        match compose(print.clone(), binary) {
            Err(EvalError::CompositionArity { left: 1, right: 2 }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
        match compose(print, Value::Integer(1)) {
            Err(EvalError::InvalidOperation { .. }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }
}
