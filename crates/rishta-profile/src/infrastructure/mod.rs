//! Infrastructure layer
//!
//! Concrete implementations of the outbound ports.

pub mod http;
pub mod memory;

pub use http::HttpApiClient;
pub use memory::{InMemoryMatchApi, InMemoryProfileApi, StaticOtpVerifier};
