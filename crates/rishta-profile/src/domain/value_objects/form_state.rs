//! Working Form State
//!
//! In-progress edits keyed by schema-local field name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat key/value record as exchanged with the backend
pub type Record = Map<String, Value>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingFormState {
    values: BTreeMap<String, Value>,
}

impl WorkingFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    /// Insert only when the key is not present yet
    pub fn set_if_absent(&mut self, name: &str, value: &Value) {
        if !self.values.contains_key(name) {
            self.values.insert(name.to_string(), value.clone());
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the named field holds information.
    ///
    /// Lists need one non-blank string, strings must be non-blank after
    /// trimming, booleans and numbers always count (an explicit "No" is an
    /// answer). Null, missing and nested objects do not count.
    pub fn is_filled(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(is_filled)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for WorkingFormState {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Fill predicate for a single value
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(is_non_blank_string),
        Value::String(text) => !text.trim().is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
        Value::Null | Value::Object(_) => false,
    }
}

pub(crate) fn is_non_blank_string(value: &Value) -> bool {
    value.as_str().is_some_and(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill_predicate() {
        assert!(is_filled(&json!("Asha")));
        assert!(!is_filled(&json!("   ")));
        assert!(is_filled(&json!(false)));
        assert!(is_filled(&json!(0)));
        assert!(!is_filled(&Value::Null));
        assert!(!is_filled(&json!({ "plan": "gold" })));
        assert!(!is_filled(&json!([])));
        assert!(!is_filled(&json!(["", "  "])));
        assert!(!is_filled(&json!([1, 2])));
        assert!(is_filled(&json!(["", "Kulkarni"])));
    }

    #[test]
    fn test_set_if_absent() {
        let mut state = WorkingFormState::new();
        state.set("city", json!("Pune"));
        state.set_if_absent("city", &json!("Mumbai"));
        state.set_if_absent("state", &json!("MH"));
        assert_eq!(state.get("city"), Some(&json!("Pune")));
        assert_eq!(state.get("state"), Some(&json!("MH")));
        assert!(!state.is_filled("country"));
    }
}
