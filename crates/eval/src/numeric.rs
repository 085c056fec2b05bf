//! Operator semantics over runtime values.
//!
//! All arithmetic is checked `Decimal` arithmetic; overflow, division by
//! zero and unsupported exponents are evaluation failures, never panics.

use formlogic_core::BinaryOp;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::evaluator::Fault;
use crate::value::Value;

/// Largest exponent magnitude `^` accepts.
const MAX_EXPONENT: i64 = 1024;

pub(crate) fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Fault> {
    match (left, right) {
        (Value::Text(a), b) if op == BinaryOp::Add && !b.is_undefined() => {
            Ok(Value::Text(format!("{}{}", a, b.display_text())))
        }
        (a, Value::Text(b)) if op == BinaryOp::Add && !a.is_undefined() => {
            Ok(Value::Text(format!("{}{}", a.display_text(), b)))
        }
        (Value::Number(a), Value::Number(b)) => decimal_op(op, *a, *b).map(Value::Number),
        _ => Err(Fault::type_mismatch(format!(
            "cannot apply '{}' to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn decimal_op(op: BinaryOp, a: Decimal, b: Decimal) -> Result<Decimal, Fault> {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            if b.is_zero() {
                return Err(Fault::failed("division by zero"));
            }
            a.checked_div(b)
        }
        BinaryOp::Mod => {
            if b.is_zero() {
                return Err(Fault::failed("modulo by zero"));
            }
            a.checked_rem(b)
        }
        BinaryOp::Pow => return power(a, b),
        other => {
            return Err(Fault::failed(format!(
                "'{}' is not an arithmetic operator",
                other.symbol()
            )))
        }
    };
    result.ok_or_else(|| Fault::failed(format!("numeric overflow in '{}'", op.symbol())))
}

fn power(base: Decimal, exponent: Decimal) -> Result<Decimal, Fault> {
    if !exponent.fract().is_zero() {
        return Err(Fault::failed("non-integer exponent is not supported"));
    }
    let n = exponent
        .to_i64()
        .filter(|n| (-MAX_EXPONENT..=MAX_EXPONENT).contains(n))
        .ok_or_else(|| Fault::failed("exponent out of range"))?;
    let mut acc = Decimal::ONE;
    for _ in 0..n.unsigned_abs() {
        acc = acc
            .checked_mul(base)
            .ok_or_else(|| Fault::failed("numeric overflow in '^'"))?;
    }
    if n < 0 {
        if acc.is_zero() {
            return Err(Fault::failed("division by zero"));
        }
        return Decimal::ONE
            .checked_div(acc)
            .ok_or_else(|| Fault::failed("numeric overflow in '^'"));
    }
    Ok(acc)
}

/// `==`, `!=`, ordering comparisons and `in`.
pub(crate) fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, Fault> {
    let ord = match op {
        BinaryOp::Eq => return Ok(left.loose_eq(right)),
        BinaryOp::Neq => return Ok(!left.loose_eq(right)),
        BinaryOp::In => return membership(right, left),
        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
            // Unanswered values never satisfy an ordering
            if left.is_nullish() || right.is_nullish() {
                return Ok(false);
            }
            ordering(left, right).ok_or_else(|| {
                Fault::type_mismatch(format!(
                    "cannot compare {} with {} using '{}'",
                    left.type_name(),
                    right.type_name(),
                    op.symbol()
                ))
            })?
        }
        other => {
            return Err(Fault::failed(format!(
                "'{}' is not a comparison operator",
                other.symbol()
            )))
        }
    };
    Ok(match op {
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Lte => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        _ => ord != Ordering::Less,
    })
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Whether `haystack` contains `needle`: list elements, substrings, or
/// object keys. A missing haystack contains nothing.
pub(crate) fn membership(haystack: &Value, needle: &Value) -> Result<bool, Fault> {
    match (haystack, needle) {
        (Value::Undefined | Value::Null, _) => Ok(false),
        (Value::List(items), n) => Ok(items.iter().any(|item| item.loose_eq(n))),
        (Value::Text(h), Value::Text(n)) => Ok(h.contains(n.as_str())),
        (Value::Object(map), Value::Text(k)) => Ok(map.contains_key(k)),
        (Value::Text(_) | Value::Object(_), n) if n.is_nullish() => Ok(false),
        _ => Err(Fault::type_mismatch(format!(
            "cannot search {} for {}",
            haystack.type_name(),
            needle.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalErrorKind;

    fn num(s: &str) -> Value {
        Value::Number(s.parse().unwrap())
    }

    #[test]
    fn decimal_addition_is_exact() {
        let sum = arithmetic(BinaryOp::Add, &num("0.1"), &num("0.2")).unwrap();
        assert!(sum.loose_eq(&num("0.3")));
    }

    #[test]
    fn plus_concatenates_text() {
        let v = arithmetic(BinaryOp::Add, &Value::from("n="), &num("2.50")).unwrap();
        assert_eq!(v, Value::from("n=2.5"));
    }

    #[test]
    fn division_by_zero_fails() {
        let err = arithmetic(BinaryOp::Div, &num("1"), &num("0")).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::EvaluationFailed);
    }

    #[test]
    fn arithmetic_on_undefined_is_type_mismatch() {
        let err = arithmetic(BinaryOp::Mul, &Value::Undefined, &num("2")).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
    }

    #[test]
    fn integer_powers() {
        assert_eq!(arithmetic(BinaryOp::Pow, &num("2"), &num("10")).unwrap(), num("1024"));
        assert!(arithmetic(BinaryOp::Pow, &num("2"), &num("-1"))
            .unwrap()
            .loose_eq(&num("0.5")));
        assert!(arithmetic(BinaryOp::Pow, &num("2"), &num("0.5")).is_err());
    }

    #[test]
    fn extreme_exponents_fail_without_looping() {
        let min = Value::Number(Decimal::from(i64::MIN));
        let err = arithmetic(BinaryOp::Pow, &num("2"), &min).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::EvaluationFailed);
        let huge = num("9223372036854775807");
        assert!(arithmetic(BinaryOp::Pow, &num("1"), &huge).is_err());
        assert!(arithmetic(BinaryOp::Pow, &num("1"), &num("-1025")).is_err());
        assert_eq!(arithmetic(BinaryOp::Pow, &num("1"), &num("-1024")).unwrap(), num("1"));
    }

    #[test]
    fn orderings_with_missing_values_are_false() {
        assert!(!compare(BinaryOp::Gte, &Value::Undefined, &num("18")).unwrap());
        assert!(!compare(BinaryOp::Lt, &num("1"), &Value::Null).unwrap());
    }

    #[test]
    fn ordering_mixed_types_is_type_mismatch() {
        let err = compare(BinaryOp::Lt, &Value::from("a"), &num("1")).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
    }

    #[test]
    fn in_operator() {
        let list = Value::List(vec![Value::from("a"), Value::from("b")]);
        assert!(compare(BinaryOp::In, &Value::from("b"), &list).unwrap());
        assert!(compare(BinaryOp::In, &Value::from("ell"), &Value::from("hello")).unwrap());
        assert!(!compare(BinaryOp::In, &Value::from("x"), &Value::Undefined).unwrap());
    }
}
