//! Backend Payload Transformer
//!
//! Converts the working form state back into backend field names.

use serde_json::Value;
use tracing::debug;

use crate::domain::alias::{resolve_or, RELATIVE_SURNAMES_KEY};
use crate::domain::schema::{find_field, SectionDefinition};
use crate::domain::value_objects::form_state::is_non_blank_string;
use crate::domain::value_objects::{Record, WorkingFormState};

/// Client-only nested structures that never go back in an update
pub const PASSTHROUGH_KEYS: [&str; 2] = ["profileSetup", "subscription"];

pub struct PayloadTransformer;

impl PayloadTransformer {
    /// Build the update payload.
    ///
    /// Keys are resolved through the owning field's label (the key itself
    /// when no field has that name). Null values stay as explicit nulls so
    /// the backend clears them.
    pub fn transform(sections: &[SectionDefinition], state: &WorkingFormState) -> Record {
        let mut payload = Record::new();

        for (name, value) in state.iter() {
            if PASSTHROUGH_KEYS.contains(&name.as_str()) {
                continue;
            }

            let label = find_field(sections, name).map_or(name.as_str(), |field| field.label.as_str());
            let key = resolve_or(label, name);

            let value = if key == RELATIVE_SURNAMES_KEY {
                surname_list(value)
            } else {
                drop_blank_items(value)
            };

            payload.insert(key.to_string(), value);
        }

        debug!(keys = payload.len(), "built backend payload");
        payload
    }
}

/// Remove blank strings from list values; everything else is passed through
fn drop_blank_items(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| !item.is_string() || is_non_blank_string(item))
                .cloned()
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Surnames arrive either as a list or as one comma separated string
fn surname_list(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::Array(
            text.split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .map(|piece| Value::String(piece.to_string()))
                .collect(),
        ),
        other => drop_blank_items(other),
    }
}
