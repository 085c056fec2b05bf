//! Conversion from `serde_json::Value` into schema and data types.

use serde::Deserialize;
use std::fmt;

use crate::data::FormData;
use crate::types::FormSchema;

/// Errors converting JSON into schema or data types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema document does not have the expected shape.
    InvalidSchema(String),
    /// The data payload does not have the expected shape.
    InvalidData(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::InvalidSchema(msg) => write!(f, "invalid schema: {}", msg),
            SchemaError::InvalidData(msg) => write!(f, "invalid data payload: {}", msg),
        }
    }
}

impl std::error::Error for SchemaError {}

impl FormSchema {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SchemaError> {
        if !value.is_object() {
            return Err(SchemaError::InvalidSchema(
                "schema must be a JSON object".to_string(),
            ));
        }
        FormSchema::deserialize(value).map_err(|e| SchemaError::InvalidSchema(e.to_string()))
    }
}

impl FormData {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SchemaError> {
        if !value.is_object() {
            return Err(SchemaError::InvalidData(
                "data must be a JSON object".to_string(),
            ));
        }
        FormData::deserialize(value).map_err(|e| SchemaError::InvalidData(e.to_string()))
    }
}
