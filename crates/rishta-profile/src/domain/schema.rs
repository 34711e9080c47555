//! Profile Schema
//!
//! Section and field definitions fetched from the backend at runtime. The
//! wire shape is flat (`type` + `options`); in memory the field type and its
//! constraints are one tagged enum.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::alias::normalize_label;

/// Identifier of the section whose completion is driven by photo uploads
pub const PHOTOS_SECTION: &str = "photos";

/// Field type together with its type-specific constraints
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Date,
    Select { options: Vec<String> },
    Checkbox,
}

impl FieldKind {
    /// Wire name of the type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select { .. } => "select",
            Self::Checkbox => "checkbox",
        }
    }

    /// Options offered by a select field, empty otherwise
    pub fn options(&self) -> &[String] {
        match self {
            Self::Select { options } => options,
            _ => &[],
        }
    }

    /// Convert raw user input into the JSON value stored for this kind.
    ///
    /// Blank input always clears the field.
    pub fn accepts(&self, input: &str) -> Result<Value, FieldInputError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Value::Null);
        }

        match self {
            Self::Text => Ok(Value::String(input.to_string())),
            Self::Number => {
                if let Ok(whole) = input.parse::<i64>() {
                    return Ok(Value::from(whole));
                }
                input
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| FieldInputError::NotANumber(input.to_string()))
            }
            Self::Date => NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .map_err(|_| FieldInputError::InvalidDate(input.to_string())),
            Self::Select { options } => options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(input))
                .map(|option| Value::String(option.clone()))
                .ok_or_else(|| FieldInputError::UnknownOption {
                    value: input.to_string(),
                    options: options.clone(),
                }),
            Self::Checkbox => match input.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "no" | "n" | "0" | "off" => Ok(Value::Bool(false)),
                _ => Err(FieldInputError::NotABoolean(input.to_string())),
            },
        }
    }
}

/// One form field as configured by the admin console
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Flat wire representation of a field
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawField {
    name: String,
    label: String,
    #[serde(rename = "type")]
    field_type: String,
    required: bool,
    options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
}

impl From<RawField> for FieldDefinition {
    fn from(raw: RawField) -> Self {
        let kind = match raw.field_type.to_ascii_lowercase().as_str() {
            "number" => FieldKind::Number,
            "date" => FieldKind::Date,
            "select" => FieldKind::Select { options: raw.options },
            "checkbox" => FieldKind::Checkbox,
            _ => FieldKind::Text,
        };
        Self {
            name: raw.name,
            label: raw.label,
            kind,
            required: raw.required,
            placeholder: raw.placeholder,
        }
    }
}

impl From<FieldDefinition> for RawField {
    fn from(field: FieldDefinition) -> Self {
        let field_type = field.kind.as_str().to_string();
        let options = match field.kind {
            FieldKind::Select { options } => options,
            _ => vec![],
        };
        Self {
            name: field.name,
            label: field.label,
            field_type,
            required: field.required,
            options,
            placeholder: field.placeholder,
        }
    }
}

/// A named, ordered group of fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl SectionDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self { id: id.into(), label: label.into(), fields }
    }

    /// Whether this is the distinguished photos section
    pub fn is_photos(&self) -> bool {
        normalize_label(&self.id) == PHOTOS_SECTION || normalize_label(&self.label) == PHOTOS_SECTION
    }
}

/// Find a field by its schema-local name across all sections
pub fn find_field<'a>(sections: &'a [SectionDefinition], name: &str) -> Option<&'a FieldDefinition> {
    sections
        .iter()
        .flat_map(|section| section.fields.iter())
        .find(|field| field.name == name)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldInputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("'{value}' is not one of: {}", .options.join(", "))]
    UnknownOption { value: String, options: Vec<String> },

    #[error("'{0}' is not yes/no")]
    NotABoolean(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_wire_schema() {
        let sections: Vec<SectionDefinition> = serde_json::from_value(json!([
            {
                "_id": "basic",
                "label": "Basic Details",
                "fields": [
                    { "name": "fullName", "label": "Full Name", "type": "text", "required": true },
                    { "name": "diet", "label": "Diet", "type": "select", "options": ["Veg", "Non-Veg"] },
                    { "name": "manglik", "label": "Manglik", "type": "checkbox" },
                    { "name": "pet", "label": "Pet", "type": "hologram" }
                ]
            }
        ]))
        .unwrap();

        let fields = &sections[0].fields;
        assert_eq!(sections[0].id, "basic");
        assert!(fields[0].required);
        assert_eq!(fields[1].kind.options(), ["Veg", "Non-Veg"]);
        assert_eq!(fields[2].kind, FieldKind::Checkbox);
        assert_eq!(fields[3].kind, FieldKind::Text);
    }

    #[test]
    fn test_serialize_keeps_flat_shape() {
        let field = FieldDefinition::new("diet", "Diet", FieldKind::Select { options: vec!["Veg".into()] });
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "select");
        assert_eq!(value["options"], json!(["Veg"]));
    }

    #[test]
    fn test_photos_section_detection() {
        assert!(SectionDefinition::new("photos", "Gallery", vec![]).is_photos());
        assert!(SectionDefinition::new("s4", "Photos", vec![]).is_photos());
        assert!(!SectionDefinition::new("basic", "Basic", vec![]).is_photos());
    }

    #[test]
    fn test_kind_accepts_input() {
        assert_eq!(FieldKind::Number.accepts("170").unwrap(), json!(170));
        assert_eq!(FieldKind::Number.accepts("5.5").unwrap(), json!(5.5));
        assert!(FieldKind::Number.accepts("tall").is_err());
        assert_eq!(FieldKind::Checkbox.accepts("No").unwrap(), json!(false));
        assert_eq!(FieldKind::Date.accepts("1995-04-12").unwrap(), json!("1995-04-12"));
        assert!(FieldKind::Date.accepts("12/04/1995").is_err());
        assert_eq!(FieldKind::Text.accepts("   ").unwrap(), Value::Null);

        let select = FieldKind::Select { options: vec!["Veg".into(), "Non-Veg".into()] };
        assert_eq!(select.accepts("veg").unwrap(), json!("Veg"));
        assert!(matches!(select.accepts("Vegan"), Err(FieldInputError::UnknownOption { .. })));
    }

    #[test]
    fn test_find_field() {
        let sections = vec![SectionDefinition::new(
            "basic",
            "Basic",
            vec![FieldDefinition::new("dob", "Date of Birth", FieldKind::Date)],
        )];
        assert_eq!(find_field(&sections, "dob").map(|f| f.label.as_str()), Some("Date of Birth"));
        assert!(find_field(&sections, "city").is_none());
    }
}
