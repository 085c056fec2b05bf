//! Evaluation context assembly.
//!
//! Builds the variable environment expressions see: `fields` (a tree that
//! mirrors the fieldset structure, leaves wrapped as `{value}`), `parties`
//! (role -> list of `{type, data, signed}`), `witnesses`, and the computed
//! logic keys folded in dependency order.

use formlogic_core::{resolve_logic_order, LogicOrder, CONTEXT_ROOTS};
use formlogic_schema::{join_path, FieldDef, FormData, FormSchema, Party};
use serde_json::Map;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{FormLogicError, SchemaIssue};
use crate::evaluator::evaluate_or_default_at;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldNode {
    Leaf { value: Value },
    Fieldset { children: BTreeMap<String, FieldNode> },
}

impl FieldNode {
    /// Object view used when an expression reads the node as a whole.
    pub fn to_value(&self) -> Value {
        match self {
            FieldNode::Leaf { value } => {
                Value::Object(BTreeMap::from([("value".to_owned(), value.clone())]))
            }
            FieldNode::Fieldset { children } => children_value(children),
        }
    }

    fn lookup(&self, path: &[String]) -> Value {
        let Some((segment, rest)) = path.split_first() else {
            return self.to_value();
        };
        match self {
            FieldNode::Leaf { value } if segment == "value" => rest
                .iter()
                .try_fold(value, |v, s| v.get(s))
                .cloned()
                .unwrap_or_default(),
            FieldNode::Leaf { .. } => Value::Undefined,
            FieldNode::Fieldset { children } => children
                .get(segment)
                .map_or(Value::Undefined, |child| child.lookup(rest)),
        }
    }
}

fn children_value(children: &BTreeMap<String, FieldNode>) -> Value {
    Value::Object(
        children
            .iter()
            .map(|(id, node)| (id.clone(), node.to_value()))
            .collect(),
    )
}

/// A party or witness as expressions see it.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyEntry {
    pub kind: String,
    pub data: Value,
    pub signed: bool,
}

impl PartyEntry {
    pub fn from_party(party: &Party) -> Self {
        PartyEntry {
            kind: party.kind.clone(),
            data: Value::from_json(&party.data),
            signed: party.is_signed(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(BTreeMap::from([
            ("type".to_owned(), Value::Text(self.kind.clone())),
            ("data".to_owned(), self.data.clone()),
            ("signed".to_owned(), Value::Bool(self.signed)),
        ]))
    }
}

fn entries_value(entries: &[PartyEntry]) -> Value {
    Value::List(entries.iter().map(PartyEntry::to_value).collect())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalContext {
    pub fields: BTreeMap<String, FieldNode>,
    pub parties: BTreeMap<String, Vec<PartyEntry>>,
    pub witnesses: Vec<PartyEntry>,
    pub logic: BTreeMap<String, Value>,
}

impl EvalContext {
    /// A new context with one more logic value; the receiver is consumed.
    pub fn with_logic_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.logic.insert(key.into(), value);
        self
    }

    pub fn logic_value(&self, key: &str) -> Option<&Value> {
        self.logic.get(key)
    }

    /// Value of a dotted variable path. `None` when the root name is not
    /// bound at all; missing members below a bound root are `Undefined`.
    pub fn resolve(&self, segments: &[String]) -> Option<Value> {
        let (root, rest) = segments.split_first()?;
        let (base, rest) = match root.as_str() {
            "fields" => return Some(lookup_fields(&self.fields, rest)),
            "parties" => match rest.split_first() {
                None => (
                    Value::Object(
                        self.parties
                            .iter()
                            .map(|(role, entries)| (role.clone(), entries_value(entries)))
                            .collect(),
                    ),
                    rest,
                ),
                Some((role, rest)) => (
                    self.parties
                        .get(role)
                        .map_or(Value::Undefined, |entries| entries_value(entries)),
                    rest,
                ),
            },
            "witnesses" => (entries_value(&self.witnesses), rest),
            key => (self.logic.get(key)?.clone(), rest),
        };
        Some(
            rest.iter()
                .try_fold(&base, |v, s| v.get(s))
                .cloned()
                .unwrap_or_default(),
        )
    }
}

fn lookup_fields(fields: &BTreeMap<String, FieldNode>, path: &[String]) -> Value {
    match path.split_first() {
        None => children_value(fields),
        Some((id, rest)) => fields
            .get(id)
            .map_or(Value::Undefined, |node| node.lookup(rest)),
    }
}

/// Value at a dotted field path (`address.city`). A leaf yields its
/// unwrapped value, a fieldset its object view.
pub fn get_field_value_from_context(
    fields: &BTreeMap<String, FieldNode>,
    path: &str,
) -> Option<Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let node = segments.try_fold(fields.get(first)?, |node, seg| match node {
        FieldNode::Fieldset { children } => children.get(seg),
        FieldNode::Leaf { .. } => None,
    })?;
    Some(match node {
        FieldNode::Leaf { value } => value.clone(),
        FieldNode::Fieldset { children } => children_value(children),
    })
}

// ── Assembly ─────────────────────────────────────────────────────────

/// Structural problems that make the schema unusable for evaluation.
pub fn check_structure(schema: &FormSchema) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    check_field_ids(&schema.fields, "", &mut issues);
    for key in schema.logic.keys() {
        let problem = if key.is_empty() {
            Some("logic key must not be empty")
        } else if key.contains('.') {
            Some("logic key must not contain '.'")
        } else if CONTEXT_ROOTS.contains(&key.as_str()) {
            Some("logic key shadows a reserved context root")
        } else {
            None
        };
        if let Some(message) = problem {
            issues.push(SchemaIssue::new(
                vec!["logic".to_owned(), key.clone()],
                message,
            ));
        }
    }
    issues
}

fn check_field_ids(fields: &BTreeMap<String, FieldDef>, prefix: &str, out: &mut Vec<SchemaIssue>) {
    for (id, def) in fields {
        let path = join_path(prefix, id);
        if id.is_empty() || id.contains('.') {
            out.push(SchemaIssue::new(
                vec!["fields".to_owned(), path.clone()],
                "field id must be non-empty and must not contain '.'",
            ));
        }
        if def.is_fieldset() {
            check_field_ids(&def.fields, &path, out);
        }
    }
}

/// Context with fields, parties and witnesses but no logic values.
pub fn build_base_context(
    schema: &FormSchema,
    data: &FormData,
) -> Result<EvalContext, FormLogicError> {
    let issues = check_structure(schema);
    if !issues.is_empty() {
        return Err(FormLogicError { issues });
    }

    let fields = field_nodes(&schema.fields, Some(&data.fields), &data.fields, "");

    let mut parties: BTreeMap<String, Vec<PartyEntry>> = schema
        .parties
        .keys()
        .map(|role| (role.clone(), Vec::new()))
        .collect();
    for (role, value) in &data.parties {
        parties.insert(
            role.clone(),
            value.parties().iter().map(PartyEntry::from_party).collect(),
        );
    }

    Ok(EvalContext {
        fields,
        parties,
        witnesses: data.witnesses.iter().map(PartyEntry::from_party).collect(),
        logic: BTreeMap::new(),
    })
}

/// Field tree for `defs`. A child's value comes from its parent's nested
/// object when present, else from a flat dotted key in the top-level data.
fn field_nodes(
    defs: &BTreeMap<String, FieldDef>,
    nested: Option<&Map<String, serde_json::Value>>,
    flat: &Map<String, serde_json::Value>,
    prefix: &str,
) -> BTreeMap<String, FieldNode> {
    defs.iter()
        .map(|(id, def)| {
            let path = join_path(prefix, id);
            let own = nested
                .and_then(|m| m.get(id))
                .or_else(|| flat.get(&path))
                .filter(|v| !v.is_null());
            let node = if def.is_fieldset() {
                FieldNode::Fieldset {
                    children: field_nodes(&def.fields, own.and_then(|v| v.as_object()), flat, &path),
                }
            } else {
                FieldNode::Leaf {
                    value: own.map(Value::from_json).unwrap_or_default(),
                }
            };
            (id.clone(), node)
        })
        .collect()
}

/// Full context plus the logic order it was folded in.
pub(crate) fn build_context_with_order(
    schema: &FormSchema,
    data: &FormData,
) -> Result<(EvalContext, LogicOrder), FormLogicError> {
    let base = build_base_context(schema, data)?;
    let order = resolve_logic_order(&schema.logic);
    if !order.is_acyclic() {
        warn!(
            cyclic_keys = ?order.cyclic_keys,
            "logic keys have cyclic dependencies; unresolved references read as undefined"
        );
    }

    let ctx = order.sorted.iter().fold(base, |ctx, key| {
        let Some(expr) = schema.logic.get(key) else {
            return ctx;
        };
        let value = evaluate_or_default_at(expr, &ctx, Value::Undefined, &["logic", key.as_str()]);
        ctx.with_logic_value(key.clone(), value)
    });
    Ok((ctx, order))
}

/// Build the evaluation context for a schema and its fill data.
pub fn build_form_context(
    schema: &FormSchema,
    data: &FormData,
) -> Result<EvalContext, FormLogicError> {
    build_context_with_order(schema, data).map(|(ctx, _)| ctx)
}
