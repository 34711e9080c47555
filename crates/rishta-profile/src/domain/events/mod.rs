//! Domain Events
//!
//! Events raised by aggregates and the profile editor to communicate state changes.

use chrono::{DateTime, Utc};

use crate::domain::aggregates::InterestStatus;
use crate::domain::value_objects::UserId;

/// All domain events in the profile bounded context
#[derive(Clone, Debug)]
pub enum DomainEvent {
    Interest(InterestEvent),
    Profile(ProfileEvent),
}

/// Interest-related domain events
#[derive(Clone, Debug)]
pub enum InterestEvent {
    Sent {
        interest_id: String,
        from_user: UserId,
        to_user: UserId,
        sent_at: DateTime<Utc>,
    },

    Resolved {
        interest_id: String,
        status: InterestStatus,
        resolved_at: DateTime<Utc>,
    },
}

/// Profile-related domain events
#[derive(Clone, Debug)]
pub enum ProfileEvent {
    Saved {
        user_id: UserId,
        completion: u8,
        saved_at: DateTime<Utc>,
    },

    VerificationSubmitted {
        user_id: UserId,
        submitted_at: DateTime<Utc>,
    },
}
