//! Rishta profile engine
//!
//! Client-side profile completion and field mapping for the Rishta
//! matrimonial app, following Domain-Driven Design (DDD) and a hexagonal
//! boundary towards the backend API.
//!
//! ## Architecture
//!
//! - **Domain Layer**: schema model, alias table, photo slots, interests, pure engine services
//! - **Application Layer**: profile editor, login sessions, match browsing
//! - **Ports Layer**: remote API traits
//! - **Infrastructure Layer**: HTTP client and in-memory backends
//!
//! ## Engine
//!
//! - Alias resolution from human labels to canonical record keys
//! - Seeding a working form state from a flat user record
//! - Completion percentage per section and overall
//! - Update payload construction, including list-valued surnames
//! - Four photo slots with exactly one primary

pub mod domain;
pub mod application;
pub mod ports;
pub mod infrastructure;

// Re-exports for convenience
pub use domain::aggregates::{Interest, InterestStatus, PhotoSlot, PhotoSlots};
pub use domain::schema::{FieldDefinition, FieldKind, SectionDefinition};
pub use domain::services::{CompletionCalculator, CompletionReport, FormNormalizer, PayloadTransformer};
pub use domain::value_objects::{Phone, Record, UserId, WorkingFormState};
pub use domain::events::DomainEvent;
pub use application::{AuthService, MatchService, ProfileEditor, Session};
pub use ports::outbound::{ApiError, MatchApi, OtpVerifier, ProfileApi};
