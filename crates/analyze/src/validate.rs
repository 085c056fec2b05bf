//! Boolean-type validation for conditional flags.
//!
//! Design-time guidance only; runtime evaluation never consults it.

use formlogic_core::{parse, ExprType, InferredType};
use serde::Serialize;

use crate::infer::infer;
use crate::type_env::TypeEnvironment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeIssue {
    pub severity: Severity,
    pub message: String,
    pub inferred: InferredType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BooleanTypeCheck {
    Valid,
    Issue(TypeIssue),
}

impl BooleanTypeCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, BooleanTypeCheck::Valid)
    }

    pub fn issue(&self) -> Option<&TypeIssue> {
        match self {
            BooleanTypeCheck::Valid => None,
            BooleanTypeCheck::Issue(issue) => Some(issue),
        }
    }
}

/// Check that `expr` produces a boolean.
///
/// | inferred                   | result  |
/// |----------------------------|---------|
/// | boolean (certain/probable) | valid   |
/// | certain non-boolean        | error   |
/// | probable non-boolean       | warning |
/// | unknown                    | warning |
/// | does not parse             | error   |
pub fn validate_boolean_type(expr: &str, env: &TypeEnvironment) -> BooleanTypeCheck {
    let tree = match parse(expr) {
        Ok(tree) => tree,
        Err(e) => {
            return BooleanTypeCheck::Issue(TypeIssue {
                severity: Severity::Error,
                message: format!("expression does not parse: {}", e),
                inferred: InferredType::Unknown,
            })
        }
    };
    let inferred = infer(&tree, env);
    let (severity, message) = match inferred {
        InferredType::Certain(ExprType::Boolean) | InferredType::Probable(ExprType::Boolean) => {
            return BooleanTypeCheck::Valid
        }
        InferredType::Certain(t) => (
            Severity::Error,
            format!("expected a boolean expression, found {}", t),
        ),
        InferredType::Probable(t) => (
            Severity::Warning,
            format!("expected a boolean expression, probably found {}", t),
        ),
        InferredType::Unknown => (
            Severity::Warning,
            "cannot determine that the expression is boolean; it will be read by truthiness"
                .to_owned(),
        ),
    };
    BooleanTypeCheck::Issue(TypeIssue {
        severity,
        message,
        inferred,
    })
}
