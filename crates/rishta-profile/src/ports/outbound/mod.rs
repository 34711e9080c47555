//! Outbound ports (remote API traits)
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::InterestRecord;
use crate::domain::schema::SectionDefinition;
use crate::domain::services::CandidateSummary;
use crate::domain::value_objects::{Phone, Record, UserId};

/// Profile endpoints
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Fetch the admin-configured profile sections
    async fn fetch_schema(&self) -> Result<Vec<SectionDefinition>, ApiError>;

    /// Fetch the flat user record
    async fn fetch_user(&self, user_id: &UserId) -> Result<Record, ApiError>;

    /// Persist an update payload; null values clear fields
    async fn update_user(&self, user_id: &UserId, payload: Record) -> Result<(), ApiError>;

    /// Ask the backend to start profile verification
    async fn submit_verification(&self, user_id: &UserId) -> Result<VerificationReceipt, ApiError>;
}

/// Match browsing and interest endpoints
#[async_trait]
pub trait MatchApi: Send + Sync {
    /// Candidates suggested for the signed-in user
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, ApiError>;

    /// Send an interest
    async fn send_interest(
        &self,
        from: &UserId,
        to: &UserId,
        message: Option<&str>,
    ) -> Result<InterestRecord, ApiError>;

    /// Interests sent or received by a user
    async fn list_interests(&self, user_id: &UserId) -> Result<Vec<InterestRecord>, ApiError>;

    /// Accept or decline a received interest
    async fn respond_interest(&self, interest_id: &str, accept: bool) -> Result<InterestRecord, ApiError>;

    /// Take back a sent interest that has not been answered
    async fn withdraw_interest(&self, interest_id: &str) -> Result<InterestRecord, ApiError>;
}

/// One-time-password login
#[async_trait]
pub trait OtpVerifier: Send + Sync {
    /// Send a login code to the phone
    async fn request_code(&self, phone: &Phone) -> Result<(), ApiError>;

    /// Exchange a code for credentials
    async fn verify_code(&self, phone: &Phone, code: &str) -> Result<Credentials, ApiError>;
}

/// Backend answer to a verification submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReceipt {
    #[serde(default = "pending")]
    pub status: String,
    /// Stamped by the server
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

fn pending() -> String {
    "pending".to_string()
}

/// Credentials issued after a successful OTP check
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub user_id: UserId,
    pub token: String,
}

/// Remote API error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend could not be reached
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a failure
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),
}
