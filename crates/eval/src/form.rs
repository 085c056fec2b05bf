//! Whole-form evaluation: visibility, requiredness and disabled state of
//! every field and annex, plus the computed logic values.

use formlogic_schema::{join_path, FieldDef, FormData, FormSchema};
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::{build_context_with_order, EvalContext};
use crate::error::FormLogicError;
use crate::evaluator::evaluate_cond_expr;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRuntimeState {
    pub visible: bool,
    pub required: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnnexRuntimeState {
    pub visible: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRuntimeState {
    /// Keyed by full dotted path; fieldsets and their children both appear.
    pub fields: BTreeMap<String, FieldRuntimeState>,
    pub annexes: BTreeMap<String, AnnexRuntimeState>,
    pub logic_values: BTreeMap<String, Value>,
    /// Logic keys that could not be ordered; empty for a well-formed schema.
    pub cyclic_keys: Vec<String>,
}

/// Evaluate every conditional flag in the schema against `data`.
///
/// Individual expression failures never fail the form; the flag takes its
/// default (visible: true, required: the static flag or false, disabled:
/// false). Only structural problems return an error.
pub fn evaluate_form_logic(
    schema: &FormSchema,
    data: &FormData,
) -> Result<FormRuntimeState, FormLogicError> {
    let (ctx, order) = build_context_with_order(schema, data)?;

    let mut fields = BTreeMap::new();
    evaluate_fields(&schema.fields, "", &ctx, &mut fields);

    let annexes = schema
        .annexes
        .iter()
        .map(|(id, annex)| {
            let state = AnnexRuntimeState {
                visible: evaluate_cond_expr(
                    annex.visible.as_ref(),
                    &ctx,
                    true,
                    &["annexes", id.as_str(), "visible"],
                ),
                required: evaluate_cond_expr(
                    annex.required.as_ref(),
                    &ctx,
                    false,
                    &["annexes", id.as_str(), "required"],
                ),
            };
            (id.clone(), state)
        })
        .collect();

    Ok(FormRuntimeState {
        fields,
        annexes,
        logic_values: ctx.logic,
        cyclic_keys: order.cyclic_keys,
    })
}

fn evaluate_fields(
    defs: &BTreeMap<String, FieldDef>,
    prefix: &str,
    ctx: &EvalContext,
    out: &mut BTreeMap<String, FieldRuntimeState>,
) {
    for (id, def) in defs {
        let path = join_path(prefix, id);
        let at = |flag: &'static str| ["fields", path.as_str(), flag];
        let state = FieldRuntimeState {
            visible: evaluate_cond_expr(def.visible.as_ref(), ctx, true, &at("visible")),
            required: evaluate_cond_expr(def.required.as_ref(), ctx, false, &at("required")),
            disabled: evaluate_cond_expr(def.disabled.as_ref(), ctx, false, &at("disabled")),
        };
        out.insert(path.clone(), state);
        // A hidden fieldset does not hide its children here; renderers decide
        if def.is_fieldset() {
            evaluate_fields(&def.fields, &path, ctx, out);
        }
    }
}

/// Only the computed logic values.
pub fn get_logic_values(
    schema: &FormSchema,
    data: &FormData,
) -> Result<BTreeMap<String, Value>, FormLogicError> {
    build_context_with_order(schema, data).map(|(ctx, _)| ctx.logic)
}

pub fn get_field_runtime_state<'a>(
    state: &'a FormRuntimeState,
    path: &str,
) -> Option<&'a FieldRuntimeState> {
    state.fields.get(path)
}

pub fn get_annex_runtime_state<'a>(
    state: &'a FormRuntimeState,
    id: &str,
) -> Option<&'a AnnexRuntimeState> {
    state.annexes.get(id)
}

/// A schema paired with fill data. The runtime state is computed on first
/// access and cached; new data means a new `FilledForm`.
#[derive(Debug)]
pub struct FilledForm {
    schema: Arc<FormSchema>,
    data: FormData,
    runtime: OnceCell<Result<FormRuntimeState, FormLogicError>>,
}

impl FilledForm {
    pub fn new(schema: impl Into<Arc<FormSchema>>, data: FormData) -> Self {
        FilledForm {
            schema: schema.into(),
            data,
            runtime: OnceCell::new(),
        }
    }

    /// Same schema, different data.
    pub fn with_data(&self, data: FormData) -> Self {
        FilledForm::new(Arc::clone(&self.schema), data)
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn runtime_state(&self) -> Result<&FormRuntimeState, &FormLogicError> {
        self.runtime
            .get_or_init(|| evaluate_form_logic(&self.schema, &self.data))
            .as_ref()
    }

    pub fn field_state(&self, path: &str) -> Option<FieldRuntimeState> {
        let state = self.runtime_state().ok()?;
        get_field_runtime_state(state, path).copied()
    }

    pub fn annex_state(&self, id: &str) -> Option<AnnexRuntimeState> {
        let state = self.runtime_state().ok()?;
        get_annex_runtime_state(state, id).copied()
    }

    pub fn logic_value(&self, key: &str) -> Option<&Value> {
        self.runtime_state().ok()?.logic_values.get(key)
    }
}
