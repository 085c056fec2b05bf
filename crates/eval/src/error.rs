use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EvalErrorKind {
    SyntaxError,
    UndefinedVariable,
    TypeMismatch,
    EvaluationFailed,
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvalErrorKind::SyntaxError => "syntax error",
            EvalErrorKind::UndefinedVariable => "undefined variable",
            EvalErrorKind::TypeMismatch => "type mismatch",
            EvalErrorKind::EvaluationFailed => "evaluation failed",
        })
    }
}

/// Failure of a single expression, carrying the offending source text and,
/// when known, where in the schema it came from (`["fields", "age", "visible"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} in `{expression}`{}", detail(.cause))]
pub struct ExpressionEvaluationError {
    pub kind: EvalErrorKind,
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

fn detail(cause: &Option<String>) -> String {
    cause.as_ref().map(|c| format!(": {}", c)).unwrap_or_default()
}

impl ExpressionEvaluationError {
    pub fn new(kind: EvalErrorKind, expression: impl Into<String>) -> Self {
        ExpressionEvaluationError {
            kind,
            expression: expression.into(),
            cause: None,
            path: Vec::new(),
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_path<S: AsRef<str>>(mut self, path: &[S]) -> Self {
        self.path = path.iter().map(|s| s.as_ref().to_owned()).collect();
        self
    }
}

/// A structural problem that makes a schema/data pair unusable for
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(path: Vec<String>, message: impl Into<String>) -> Self {
        SchemaIssue {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.join("."), self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("form logic cannot be evaluated: {}", summary(.issues))]
pub struct FormLogicError {
    pub issues: Vec<SchemaIssue>,
}

fn summary(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
