//! Form logic evaluator -- accepts a form schema and its fill data,
//! produces the runtime state of every field and annex.
//!
//! The evaluator builds a context from the data (fields, parties,
//! witnesses), folds the schema's logic keys into it in dependency order,
//! then evaluates each conditional flag. Expression failures fall back to
//! flag defaults; only structural schema problems are errors.

pub mod context;
pub mod error;
pub mod evaluator;
pub mod form;
mod functions;
mod numeric;
pub mod value;

pub use context::{
    build_base_context, build_form_context, check_structure, get_field_value_from_context,
    EvalContext, FieldNode, PartyEntry,
};
pub use error::{EvalErrorKind, ExpressionEvaluationError, FormLogicError, SchemaIssue};
pub use evaluator::{
    evaluate_boolean_expression, evaluate_cond_expr, evaluate_expression, evaluate_expression_at,
    evaluate_expression_or_default, evaluate_multiple_expressions,
};
pub use form::{
    evaluate_form_logic, get_annex_runtime_state, get_field_runtime_state, get_logic_values,
    AnnexRuntimeState, FieldRuntimeState, FilledForm, FormRuntimeState,
};
pub use value::Value;

use formlogic_schema::{FormData, FormSchema, SchemaError};

/// Failure of the JSON-in entry point.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Logic(#[from] FormLogicError),
}

/// Evaluate form logic from raw JSON.
///
/// # Arguments
/// * `schema` - form schema JSON (`fields`, `annexes`, `parties`, `logic`)
/// * `data` - fill data JSON (`fields`, `annexes`, `parties`, `witnesses`)
pub fn evaluate(
    schema: &serde_json::Value,
    data: &serde_json::Value,
) -> Result<FormRuntimeState, EvaluateError> {
    let schema = FormSchema::from_json(schema)?;
    let data = FormData::from_json(data)?;
    Ok(evaluate_form_logic(&schema, &data)?)
}
