//! Form Data Normalizer
//!
//! Seeds a working form state from the backend user record.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::alias::resolve_or;
use crate::domain::schema::SectionDefinition;
use crate::domain::value_objects::{Record, WorkingFormState};

pub struct FormNormalizer;

impl FormNormalizer {
    /// Map a backend record onto the schema's field names.
    ///
    /// Each field reads the record under its resolved backend key, falling
    /// back to its own name. Record keys no field claimed are carried over
    /// verbatim so they survive the trip back through the payload transformer.
    pub fn seed(sections: &[SectionDefinition], record: &Record) -> WorkingFormState {
        let mut state = WorkingFormState::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        for field in sections.iter().flat_map(|section| section.fields.iter()) {
            let key = resolve_or(&field.label, &field.name);

            if let Some(value) = record.get(key) {
                state.set(field.name.clone(), value.clone());
                claimed.insert(key);
            } else if let Some(value) = record.get(field.name.as_str()) {
                state.set(field.name.clone(), value.clone());
                claimed.insert(field.name.as_str());
            }
        }

        let mut carried = 0usize;
        for (key, value) in record {
            if !claimed.contains(key.as_str()) && !state.contains(key) {
                state.set(key.clone(), value.clone());
                carried += 1;
            }
        }

        debug!(fields = claimed.len(), carried, "seeded working form state");
        state
    }
}
