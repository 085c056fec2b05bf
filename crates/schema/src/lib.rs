//! formlogic-schema: the schema and data payload shapes the logic engine
//! consumes.
//!
//! Schema validation and coercion happen upstream; these types only model
//! what the engine reads: the field/fieldset tree with its conditional
//! expressions, annexes, party roles, the logic section, and the filled
//! data payload. [`FormSchema::from_json`] and [`FormData::from_json`] are
//! the entry points from `serde_json::Value`.

pub mod data;
pub mod deserialize;
pub mod types;

pub use data::{FormData, Party, PartyValue};
pub use deserialize::SchemaError;
pub use types::*;
