//! Form logic static analyzer -- type environment, type inference and
//! schema lint with structured output.
//!
//! Everything here is design-time guidance for authoring tools. Findings
//! are collected, never thrown, and nothing in this crate affects how a
//! form evaluates at fill time.

pub mod infer;
pub mod report;
pub mod type_env;
pub mod validate;

pub use infer::{infer, infer_expression_type};
pub use report::{lint_schema, Diagnostic, DiagnosticKind, LintReport};
pub use type_env::{build_form_type_environment, field_kind_type, TypeEnvironment};
pub use validate::{validate_boolean_type, BooleanTypeCheck, Severity, TypeIssue};

use formlogic_schema::{FormSchema, SchemaError};

/// Lint a schema given as JSON.
pub fn analyze(schema: &serde_json::Value) -> Result<LintReport, SchemaError> {
    let schema = FormSchema::from_json(schema)?;
    Ok(lint_schema(&schema))
}
