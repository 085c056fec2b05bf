//! The filled data payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A signing party or witness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// `person`, `organization`, or any host-defined kind.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
    /// Signature payload; present once the party has signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<serde_json::Value>,
}

impl Party {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// Role data as supplied: a single party or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartyValue {
    Many(Vec<Party>),
    One(Party),
}

impl PartyValue {
    /// Parties for the role; a single party becomes a one-element list.
    pub fn parties(&self) -> &[Party] {
        match self {
            PartyValue::Many(list) => list,
            PartyValue::One(p) => std::slice::from_ref(p),
        }
    }
}

/// Validated fill data. Fieldset values may be nested objects
/// (`{"address": {"city": ...}}`) or flat dotted keys
/// (`{"address.city": ...}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub annexes: serde_json::Map<String, serde_json::Value>,
    pub parties: BTreeMap<String, PartyValue>,
    pub witnesses: Vec<Party>,
}
