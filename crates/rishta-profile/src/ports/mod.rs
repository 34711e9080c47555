//! Ports module
//!
//! Hexagonal architecture boundary towards the remote API.

pub mod outbound;

pub use outbound::{ApiError, Credentials, MatchApi, OtpVerifier, ProfileApi, VerificationReceipt};
