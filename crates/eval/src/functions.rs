//! Runtime implementations of the built-in functions.

use formlogic_core::lookup_builtin;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::evaluator::Fault;
use crate::numeric::membership;
use crate::value::Value;

/// Call a built-in with already evaluated arguments.
pub(crate) fn call_builtin(name: &str, args: &[Value]) -> Result<Value, Fault> {
    let signature =
        lookup_builtin(name).ok_or_else(|| Fault::failed(format!("unknown function '{}'", name)))?;
    if !signature.arity.accepts(args.len()) {
        return Err(Fault::failed(format!(
            "{}() does not take {} argument(s)",
            name,
            args.len()
        )));
    }

    match (name, args) {
        ("abs", [v]) => Ok(Value::Number(number_arg(name, v)?.abs())),
        ("ceil", [v]) => Ok(Value::Number(number_arg(name, v)?.ceil())),
        ("floor", [v]) => Ok(Value::Number(number_arg(name, v)?.floor())),
        ("round", [v]) => Ok(Value::Number(round(number_arg(name, v)?, 0))),
        ("round", [v, places]) => {
            let places = number_arg(name, places)?
                .to_u32()
                .filter(|p| *p <= 28)
                .ok_or_else(|| Fault::failed("round() places must be between 0 and 28"))?;
            Ok(Value::Number(round(number_arg(name, v)?, places)))
        }
        ("min", _) => extremum(name, args, <Decimal as Ord>::min),
        ("max", _) => extremum(name, args, <Decimal as Ord>::max),
        ("length", [v]) => match v {
            Value::Text(s) => Ok(Value::from(s.chars().count() as i64)),
            Value::List(items) => Ok(Value::from(items.len() as i64)),
            Value::Object(map) => Ok(Value::from(map.len() as i64)),
            Value::Undefined | Value::Null => Ok(Value::from(0)),
            other => Err(expected(name, "a string or array", other)),
        },
        ("lower", [v]) => Ok(Value::Text(text_arg(name, v)?.to_lowercase())),
        ("upper", [v]) => Ok(Value::Text(text_arg(name, v)?.to_uppercase())),
        ("trim", [v]) => Ok(Value::Text(text_arg(name, v)?.trim().to_owned())),
        ("contains", [haystack, needle]) => membership(haystack, needle).map(Value::Bool),
        ("isEmpty", [v]) => Ok(Value::Bool(match v {
            Value::Undefined | Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        })),
        ("if", [condition, then_value, else_value]) => Ok(if condition.is_truthy() {
            then_value.clone()
        } else {
            else_value.clone()
        }),
        ("coalesce", _) => Ok(args
            .iter()
            .find(|v| !v.is_nullish())
            .cloned()
            .unwrap_or_default()),
        _ => Err(Fault::failed(format!("unknown function '{}'", name))),
    }
}

fn round(n: Decimal, places: u32) -> Decimal {
    n.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// `min`/`max` over the arguments, or over the elements of a single list
/// argument.
fn extremum(name: &str, args: &[Value], pick: fn(Decimal, Decimal) -> Decimal) -> Result<Value, Fault> {
    let items = match args {
        [Value::List(items)] => items.as_slice(),
        _ => args,
    };
    let mut numbers = items.iter().map(|v| number_arg(name, v));
    let first = numbers
        .next()
        .ok_or_else(|| Fault::failed(format!("{}() of an empty list", name)))??;
    numbers
        .try_fold(first, |acc, n| n.map(|n| pick(acc, n)))
        .map(Value::Number)
}

fn number_arg(name: &str, v: &Value) -> Result<Decimal, Fault> {
    v.as_number().ok_or_else(|| expected(name, "a number", v))
}

fn text_arg<'v>(name: &str, v: &'v Value) -> Result<&'v str, Fault> {
    v.as_str().ok_or_else(|| expected(name, "a string", v))
}

fn expected(name: &str, what: &str, got: &Value) -> Fault {
    Fault::type_mismatch(format!("{}() expects {}, got {}", name, what, got.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalErrorKind;

    fn num(s: &str) -> Value {
        Value::Number(s.parse().unwrap())
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(call_builtin("round", &[num("2.5")]).unwrap(), num("3"));
        assert_eq!(call_builtin("round", &[num("-2.5")]).unwrap(), num("-3"));
        assert_eq!(call_builtin("round", &[num("1.235"), num("2")]).unwrap(), num("1.24"));
    }

    #[test]
    fn min_max_over_arguments_and_lists() {
        assert_eq!(call_builtin("max", &[num("1"), num("7"), num("3")]).unwrap(), num("7"));
        let list = Value::List(vec![num("4"), num("-2")]);
        assert_eq!(call_builtin("min", &[list]).unwrap(), num("-2"));
        assert!(call_builtin("min", &[Value::List(vec![])]).is_err());
    }

    #[test]
    fn string_helpers() {
        assert_eq!(call_builtin("upper", &[Value::from("ab")]).unwrap(), Value::from("AB"));
        assert_eq!(call_builtin("trim", &[Value::from("  x ")]).unwrap(), Value::from("x"));
        assert_eq!(call_builtin("length", &[Value::from("héllo")]).unwrap(), num("5"));
    }

    #[test]
    fn is_empty_and_coalesce() {
        assert_eq!(call_builtin("isEmpty", &[Value::Undefined]).unwrap(), Value::Bool(true));
        assert_eq!(call_builtin("isEmpty", &[num("0")]).unwrap(), Value::Bool(false));
        assert_eq!(
            call_builtin("coalesce", &[Value::Null, Value::Undefined, Value::from("d")]).unwrap(),
            Value::from("d")
        );
    }

    #[test]
    fn wrong_arity_and_types() {
        let err = call_builtin("abs", &[]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::EvaluationFailed);
        let err = call_builtin("abs", &[Value::from("x")]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
        let err = call_builtin("sqrt", &[num("4")]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::EvaluationFailed);
    }
}
