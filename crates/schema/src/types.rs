//! Typed structs for the form schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logic-key name to expression string. Order carries no meaning; evaluation
/// order is derived from dependencies.
pub type LogicSection = BTreeMap<String, String>;

/// A conditional flag: either a literal boolean used as a static value, or an
/// expression evaluated at fill time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CondExpr {
    Static(bool),
    Expr(String),
}

impl CondExpr {
    pub fn as_expression(&self) -> Option<&str> {
        match self {
            CondExpr::Expr(e) => Some(e),
            CondExpr::Static(_) => None,
        }
    }

    pub fn as_static(&self) -> Option<bool> {
        match self {
            CondExpr::Static(b) => Some(*b),
            CondExpr::Expr(_) => None,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, CondExpr::Expr(_))
    }
}

impl From<bool> for CondExpr {
    fn from(b: bool) -> Self {
        CondExpr::Static(b)
    }
}

impl From<&str> for CondExpr {
    fn from(e: &str) -> Self {
        CondExpr::Expr(e.to_owned())
    }
}

/// True when a raw schema value is an expression rather than a literal
/// boolean default.
pub fn is_cond_expr(value: &serde_json::Value) -> bool {
    value.is_string()
}

// ── Fields ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Url,
    Phone,
    Select,
    Number,
    Percentage,
    Rating,
    Boolean,
    Checkbox,
    Date,
    Time,
    Datetime,
    Multiselect,
    Address,
    Money,
    Person,
    Organization,
    Coordinate,
    Duration,
    Fieldset,
    /// Any kind this engine does not know about.
    #[serde(other)]
    Other,
}

/// A field or fieldset. Fieldsets carry their children in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<CondExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<CondExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<CondExpr>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldDef>,
}

impl FieldDef {
    pub fn new(kind: FieldKind) -> Self {
        FieldDef {
            kind,
            label: None,
            visible: None,
            required: None,
            disabled: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn fieldset(children: BTreeMap<String, FieldDef>) -> Self {
        FieldDef {
            fields: children,
            ..FieldDef::new(FieldKind::Fieldset)
        }
    }

    pub fn is_fieldset(&self) -> bool {
        self.kind == FieldKind::Fieldset
    }
}

// ── Annexes and parties ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnexDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<CondExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<CondExpr>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<CondExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<CondExpr>,
}

// ── Schema ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSchema {
    pub fields: BTreeMap<String, FieldDef>,
    pub annexes: BTreeMap<String, AnnexDef>,
    pub parties: BTreeMap<String, PartyDef>,
    pub logic: LogicSection,
}

impl FormSchema {
    /// Every field and fieldset, depth first, with full dotted paths.
    /// A fieldset is listed before its children.
    pub fn flatten_fields(&self) -> Vec<(String, &FieldDef)> {
        let mut out = Vec::new();
        flatten_into(&self.fields, "", &mut out);
        out
    }
}

fn flatten_into<'a>(
    fields: &'a BTreeMap<String, FieldDef>,
    prefix: &str,
    out: &mut Vec<(String, &'a FieldDef)>,
) {
    for (id, def) in fields {
        let path = join_path(prefix, id);
        out.push((path.clone(), def));
        if def.is_fieldset() {
            flatten_into(&def.fields, &path, out);
        }
    }
}

/// Join a dotted prefix and a child id.
pub fn join_path(prefix: &str, id: &str) -> String {
    if prefix.is_empty() {
        id.to_owned()
    } else {
        format!("{}.{}", prefix, id)
    }
}
