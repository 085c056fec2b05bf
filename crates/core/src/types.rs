//! Confidence-graded type lattice for expression inference.
//!
//! An [`InferredType`] pairs an [`ExprType`] with how sure inference is
//! about it. `join` is the merge used wherever two possible results meet
//! (ternary branches, `if(...)`, `coalesce(...)`).

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExprType {
    Boolean,
    Number,
    String,
    Null,
    Array,
    Object,
}

impl ExprType {
    pub fn name(&self) -> &'static str {
        match self {
            ExprType::Boolean => "boolean",
            ExprType::Number => "number",
            ExprType::String => "string",
            ExprType::Null => "null",
            ExprType::Array => "array",
            ExprType::Object => "object",
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered from least to most sure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Unknown,
    Probable,
    Certain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferredType {
    Certain(ExprType),
    Probable(ExprType),
    Unknown,
}

impl InferredType {
    pub fn confidence(&self) -> Confidence {
        match self {
            InferredType::Certain(_) => Confidence::Certain,
            InferredType::Probable(_) => Confidence::Probable,
            InferredType::Unknown => Confidence::Unknown,
        }
    }

    pub fn expr_type(&self) -> Option<ExprType> {
        match self {
            InferredType::Certain(t) | InferredType::Probable(t) => Some(*t),
            InferredType::Unknown => None,
        }
    }

    pub fn is(&self, t: ExprType) -> bool {
        self.expr_type() == Some(t)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, InferredType::Unknown)
    }

    /// Certain becomes probable; everything else is unchanged.
    pub fn degrade(self) -> Self {
        match self {
            InferredType::Certain(t) => InferredType::Probable(t),
            other => other,
        }
    }

    /// Least upper bound of two possible results.
    ///
    /// Agreeing types keep the weaker confidence. An unknown side makes the
    /// known side probable. Disagreeing known types are unknown.
    pub fn join(self, other: Self) -> Self {
        match (self.expr_type(), other.expr_type()) {
            (Some(a), Some(b)) if a == b => {
                if self.confidence().min(other.confidence()) == Confidence::Certain {
                    InferredType::Certain(a)
                } else {
                    InferredType::Probable(a)
                }
            }
            (Some(t), None) | (None, Some(t)) => InferredType::Probable(t),
            _ => InferredType::Unknown,
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredType::Certain(t) => write!(f, "{}", t),
            InferredType::Probable(t) => write!(f, "{} (probable)", t),
            InferredType::Unknown => f.write_str("unknown"),
        }
    }
}

/// Serialized as `{"type": ..., "confidence": ...}`; unknown has type `"unknown"`.
impl Serialize for InferredType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("InferredType", 2)?;
        s.serialize_field("type", self.expr_type().map_or("unknown", |t| t.name()))?;
        s.serialize_field("confidence", &self.confidence())?;
        s.end()
    }
}
