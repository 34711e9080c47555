//! Session and login
//!
//! A `Session` is created by a successful OTP login and consumed by logout.
//! Services receive it explicitly instead of reading ambient globals.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::value_objects::{Phone, PhoneError, UserId};
use crate::ports::outbound::{ApiError, Credentials, OtpVerifier};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    token: String,
    phone: Option<Phone>,
}

impl Session {
    pub fn start(credentials: Credentials, phone: Option<Phone>) -> Self {
        Self {
            user_id: credentials.user_id,
            token: credentials.token,
            phone,
        }
    }

    /// Resume a session from stored credentials
    pub fn resume(user_id: UserId, token: impl Into<String>) -> Self {
        Self::start(Credentials { user_id, token: token.into() }, None)
    }

    pub fn user_id(&self) -> &UserId { &self.user_id }
    pub fn token(&self) -> &str { &self.token }
    pub fn phone(&self) -> Option<&Phone> { self.phone.as_ref() }
}

/// Login use cases
pub struct AuthService {
    verifier: Arc<dyn OtpVerifier>,
}

impl AuthService {
    pub fn new(verifier: Arc<dyn OtpVerifier>) -> Self {
        Self { verifier }
    }

    /// Send a login code; returns the normalized phone
    pub async fn request_code(&self, phone: &str) -> Result<Phone, AuthError> {
        let phone = Phone::parse(phone)?;
        self.verifier.request_code(&phone).await?;
        info!(phone = %phone.masked(), "login code requested");
        Ok(phone)
    }

    /// Verify a code and open a session
    pub async fn login(&self, phone: &str, code: &str) -> Result<Session, AuthError> {
        let phone = Phone::parse(phone)?;
        let code = code.trim();
        if !(4..=6).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::MalformedCode);
        }

        let credentials = match self.verifier.verify_code(&phone, code).await {
            Ok(credentials) => credentials,
            Err(ApiError::Rejected { status: 400 | 401 | 403, message }) => {
                warn!(phone = %phone.masked(), %message, "login code rejected");
                return Err(AuthError::InvalidCode);
            }
            Err(err) => return Err(err.into()),
        };

        info!(user_id = %credentials.user_id, "session started");
        Ok(Session::start(credentials, Some(phone)))
    }

    /// End a session; the value is consumed so it cannot be reused
    pub fn logout(&self, session: Session) -> UserId {
        info!(user_id = %session.user_id, "session ended");
        session.user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("login code must be 4 to 6 digits")]
    MalformedCode,

    #[error("login code is incorrect or expired")]
    InvalidCode,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::StaticOtpVerifier;

    fn service() -> AuthService {
        AuthService::new(Arc::new(StaticOtpVerifier::new("123456")))
    }

    #[tokio::test]
    async fn test_login_with_correct_code() {
        let auth = service();
        let phone = auth.request_code("98765 43210").await.unwrap();
        assert_eq!(phone.to_e164(), "+919876543210");

        let session = auth.login("9876543210", "123456").await.unwrap();
        assert_eq!(session.user_id().as_str(), "dev-919876543210");
        assert!(!session.token().is_empty());
        assert_eq!(session.phone(), Some(&phone));

        let user = auth.logout(session);
        assert_eq!(user.as_str(), "dev-919876543210");
    }

    #[tokio::test]
    async fn test_login_with_wrong_code() {
        let auth = service();
        assert_eq!(auth.login("9876543210", "000000").await, Err(AuthError::InvalidCode));
    }

    #[tokio::test]
    async fn test_login_validates_input() {
        let auth = service();
        assert!(matches!(auth.login("123", "123456").await, Err(AuthError::InvalidPhone(_))));
        assert_eq!(auth.login("9876543210", "12ab").await, Err(AuthError::MalformedCode));
    }
}
