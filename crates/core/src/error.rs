use serde::{Deserialize, Serialize};

/// A syntax error in an expression.
///
/// `offset` is the character offset of the offending token within the
/// expression source (expressions are single-line, so no line is tracked).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (at offset {offset})")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        ParseError {
            offset,
            message: message.into(),
        }
    }
}
