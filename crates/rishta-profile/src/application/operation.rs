//! Async operation bookkeeping
//!
//! Explicit state for network operations, stale-response detection, and the
//! transient completion notice.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long the completion notice stays visible
pub const FLASH_TTL_MS: i64 = 2500;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum OperationState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

impl OperationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Move to `InFlight`; refused while another run is in flight
    pub fn begin(&mut self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        *self = Self::InFlight;
        true
    }

    pub fn succeed(&mut self) {
        *self = Self::Succeeded;
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        *self = Self::Failed(reason.into());
    }
}

/// Hands out increasing tickets; only the newest ticket may apply its response
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

/// Transient "profile is now N% complete" notice
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionFlash {
    pub percent: u8,
    pub expires_at: DateTime<Utc>,
}

impl CompletionFlash {
    pub fn new(percent: u8, now: DateTime<Utc>) -> Self {
        Self::with_ttl(percent, now, Duration::milliseconds(FLASH_TTL_MS))
    }

    pub fn with_ttl(percent: u8, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self { percent, expires_at: now + ttl }
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
