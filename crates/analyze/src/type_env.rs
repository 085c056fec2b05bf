//! Type environment: variable path -> inferred type.
//!
//! Built in two passes. Pass 1 registers every field's value type at its
//! full dotted path plus the fixed context roots. Pass 2 infers each logic
//! key in dependency order and inserts it before the next key, so later
//! keys see the types of earlier ones.

use formlogic_core::{lookup_builtin, resolve_logic_order, BuiltinSignature, ExprType, InferredType};
use formlogic_schema::{FieldKind, FormSchema};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::infer::infer_expression_type;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypeEnvironment {
    vars: BTreeMap<String, InferredType>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        TypeEnvironment::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, t: InferredType) {
        self.vars.insert(path.into(), t);
    }

    /// Registered type of exactly `path`.
    pub fn get(&self, path: &str) -> Option<InferredType> {
        self.vars.get(path).copied()
    }

    /// Type of `path`. Unregistered paths, including members below a
    /// registered composite, are unknown.
    pub fn lookup(&self, path: &str) -> InferredType {
        self.get(path).unwrap_or(InferredType::Unknown)
    }

    /// Whether `root` itself is registered as a name, such as a logic key
    /// or one of the `fields`/`parties`/`witnesses` roots. Exact match only.
    pub fn has_root(&self, root: &str) -> bool {
        self.vars.contains_key(root)
    }

    pub fn builtin(&self, name: &str) -> Option<&'static BuiltinSignature> {
        lookup_builtin(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, InferredType)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Static type of a field's value, or `None` when the kind is unknown or
/// has no value of its own (fieldsets).
pub fn field_kind_type(kind: FieldKind) -> Option<ExprType> {
    match kind {
        FieldKind::Text
        | FieldKind::Textarea
        | FieldKind::Email
        | FieldKind::Url
        | FieldKind::Phone
        | FieldKind::Select
        | FieldKind::Date
        | FieldKind::Time
        | FieldKind::Datetime => Some(ExprType::String),
        FieldKind::Number | FieldKind::Percentage | FieldKind::Rating => Some(ExprType::Number),
        FieldKind::Boolean | FieldKind::Checkbox => Some(ExprType::Boolean),
        FieldKind::Multiselect => Some(ExprType::Array),
        FieldKind::Address
        | FieldKind::Money
        | FieldKind::Person
        | FieldKind::Organization
        | FieldKind::Coordinate
        | FieldKind::Duration => Some(ExprType::Object),
        FieldKind::Fieldset | FieldKind::Other => None,
    }
}

pub fn build_form_type_environment(schema: &FormSchema) -> TypeEnvironment {
    let mut env = TypeEnvironment::new();

    // Pass 1: context roots and fields
    env.insert("fields", InferredType::Certain(ExprType::Object));
    env.insert("parties", InferredType::Certain(ExprType::Object));
    env.insert("witnesses", InferredType::Certain(ExprType::Array));
    for role in schema.parties.keys() {
        env.insert(format!("parties.{}", role), InferredType::Certain(ExprType::Array));
    }
    for (path, def) in schema.flatten_fields() {
        env.insert(format!("fields.{}", path), InferredType::Certain(ExprType::Object));
        if !def.is_fieldset() {
            let value_type = field_kind_type(def.kind).map_or(InferredType::Unknown, InferredType::Certain);
            env.insert(format!("fields.{}.value", path), value_type);
        }
    }

    // Pass 2: logic keys in dependency order
    let order = resolve_logic_order(&schema.logic);
    for key in &order.sorted {
        let Some(expr) = schema.logic.get(key) else {
            continue;
        };
        let inferred = infer_expression_type(expr, &env);
        debug!(key = %key, inferred = %inferred, "inferred logic key type");
        env.insert(key.clone(), inferred);
    }

    env
}
