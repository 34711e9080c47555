//! Value Objects module
//!
//! Immutable, validated domain primitives.

pub mod birth_date;
pub mod form_state;
pub mod phone;

pub use birth_date::{age_on, parse_dob};
pub use form_state::{is_filled, Record, WorkingFormState};
pub use phone::{Phone, PhoneError};

/// Identifier of a user account on the backend
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
