//! Phone Value Object
//!
//! Mobile number used as the login identity for OTP authentication.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Country code assumed when the user types a bare national number
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Mobile number value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone {
    country_code: String,
    number: String,
}

impl Phone {
    /// Create a phone number from a country code and a national number
    pub fn new(country_code: impl Into<String>, number: impl Into<String>) -> Result<Self, PhoneError> {
        let country_code = Self::normalize_country_code(&country_code.into());
        let number = number.into();
        let number = number.trim();

        if number.is_empty() {
            return Err(PhoneError::Empty);
        }

        if number.chars().any(|c| !(c.is_ascii_digit() || c == ' ' || c == '-')) {
            return Err(PhoneError::InvalidCharacters);
        }

        let number = Self::normalize_number(number);
        if number.len() != 10 {
            return Err(PhoneError::InvalidLength);
        }

        Ok(Self { country_code, number })
    }

    /// Parse user input: `+919876543210`, `98765 43210`, `09876543210`
    pub fn parse(value: &str) -> Result<Self, PhoneError> {
        let value = value.trim();

        if let Some(rest) = value.strip_prefix('+') {
            let digits = Self::normalize_number(rest);
            if digits.len() <= 10 {
                return Err(PhoneError::InvalidLength);
            }
            let (code, number) = digits.split_at(digits.len() - 10);
            return Self::new(code, number);
        }

        let national = value.strip_prefix('0').unwrap_or(value);
        Self::new(DEFAULT_COUNTRY_CODE, national)
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// Format as E.164
    pub fn to_e164(&self) -> String {
        format!("{}{}", self.country_code, self.number)
    }

    /// Format for display with the last digits visible only
    pub fn masked(&self) -> String {
        format!("{} ******{}", self.country_code, &self.number[6..])
    }

    fn normalize_country_code(code: &str) -> String {
        let code = code.trim();
        if code.starts_with('+') {
            code.to_string()
        } else {
            format!("+{}", code)
        }
    }

    fn normalize_number(number: &str) -> String {
        number.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_e164())
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.to_e164()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("phone number cannot be empty")]
    Empty,

    #[error("phone number must have 10 digits")]
    InvalidLength,

    #[error("phone number contains invalid characters")]
    InvalidCharacters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_parse_national() {
        let phone = Phone::parse("98765 43210").unwrap();
        assert_eq!(phone.country_code(), "+91");
        assert_eq!(phone.number(), "9876543210");
    }

    #[test]
    fn test_phone_parse_trunk_prefix() {
        assert_eq!(Phone::parse("09876543210").unwrap().to_e164(), "+919876543210");
    }

    #[test]
    fn test_phone_e164() {
        let phone = Phone::parse("+15551234567").unwrap();
        assert_eq!(phone.country_code(), "+1");
        assert_eq!(phone.to_e164(), "+15551234567");
    }

    #[test]
    fn test_phone_masked() {
        let phone = Phone::parse("9876543210").unwrap();
        assert_eq!(phone.masked(), "+91 ******3210");
    }

    #[test]
    fn test_invalid_phones() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
        assert!(matches!(Phone::parse("12345"), Err(PhoneError::InvalidLength)));
        assert!(matches!(Phone::parse("98765abcde"), Err(PhoneError::InvalidCharacters)));
    }

    #[test]
    fn test_phone_serde() {
        let phone: Phone = serde_json::from_str("\"9876543210\"").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"+919876543210\"");
    }
}
