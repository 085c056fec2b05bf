//! Runtime values.
//!
//! All numbers are `rust_decimal::Decimal`; JSON floats are converted
//! through their decimal text so `0.1 + 0.2 == 0.3` holds.

use formlogic_core::ExprType;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent: unanswered fields, missing members, failed logic keys.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(Decimal),
    Text(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::List(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Static type of the value; `None` for undefined.
    pub fn expr_type(&self) -> Option<ExprType> {
        match self {
            Value::Undefined => None,
            Value::Null => Some(ExprType::Null),
            Value::Bool(_) => Some(ExprType::Boolean),
            Value::Number(_) => Some(ExprType::Number),
            Value::Text(_) => Some(ExprType::String),
            Value::List(_) => Some(ExprType::Array),
            Value::Object(_) => Some(ExprType::Object),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Null or undefined.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Boolean reading of the value, or `None` when it has none (undefined).
    ///
    /// Null, zero and the empty string are false; lists and objects are true.
    pub fn truthiness(&self) -> Option<bool> {
        match self {
            Value::Undefined => None,
            Value::Null => Some(false),
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(!n.is_zero()),
            Value::Text(s) => Some(!s.is_empty()),
            Value::List(_) | Value::Object(_) => Some(true),
        }
    }

    /// Truthiness inside expressions, where undefined reads as false.
    pub fn is_truthy(&self) -> bool {
        self.truthiness().unwrap_or(false)
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Named member of an object.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }

    /// Equality where null and undefined are equal to each other.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (a, b) => a == b,
        }
    }

    /// Text used when the value is concatenated onto a string.
    pub fn display_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => n.normalize().to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_owned(),
            Value::Undefined => "undefined".to_owned(),
            Value::List(items) => items
                .iter()
                .map(Value::display_text)
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => self.to_json().to_string(),
        }
    }

    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => number_from_json(n)
                .map(Value::Number)
                .unwrap_or(Value::Undefined),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// JSON form. Undefined has no JSON form and becomes null; integral
    /// numbers become JSON integers.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => decimal_to_json(*n),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn number_from_json(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    let text = n.to_string();
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

fn decimal_to_json(d: Decimal) -> serde_json::Value {
    let d = d.normalize();
    if d.scale() == 0 {
        if let Some(i) = d.to_i64() {
            return serde_json::Value::from(i);
        }
    }
    d.to_string()
        .parse::<serde_json::Number>()
        .map(serde_json::Value::Number)
        .unwrap_or_else(|_| serde_json::Value::String(d.to_string()))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_floats_become_exact_decimals() {
        let v = Value::from_json(&json!(0.1));
        assert_eq!(v, Value::Number("0.1".parse().unwrap()));
    }

    #[test]
    fn integral_numbers_serialize_as_integers() {
        let v = Value::Number("18.000".parse().unwrap());
        assert_eq!(v.to_json(), json!(18));
        let v = Value::Number("2.50".parse().unwrap());
        assert_eq!(v.to_json(), json!(2.5));
    }

    #[test]
    fn truthiness_table() {
        assert_eq!(Value::Undefined.truthiness(), None);
        assert_eq!(Value::Null.truthiness(), Some(false));
        assert_eq!(Value::from(0).truthiness(), Some(false));
        assert_eq!(Value::from("").truthiness(), Some(false));
        assert_eq!(Value::from("no").truthiness(), Some(true));
        assert_eq!(Value::List(vec![]).truthiness(), Some(true));
        assert!(!Value::Undefined.is_truthy());
    }

    #[test]
    fn null_and_undefined_are_loosely_equal() {
        assert!(Value::Null.loose_eq(&Value::Undefined));
        assert!(!Value::Null.loose_eq(&Value::from(0)));
        assert!(Value::from(2).loose_eq(&Value::Number("2.0".parse().unwrap())));
    }

    #[test]
    fn undefined_serializes_as_null() {
        let obj = Value::Object(BTreeMap::from([("a".to_owned(), Value::Undefined)]));
        assert_eq!(serde_json::to_value(&obj).unwrap(), json!({"a": null}));
    }
}
