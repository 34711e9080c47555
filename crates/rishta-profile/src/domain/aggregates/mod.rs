//! Aggregates module

pub mod interest;
pub mod photos;

pub use interest::{Interest, InterestError, InterestRecord, InterestStatus};
pub use photos::{PhotoError, PhotoSlot, PhotoSlots, PHOTO_SLOT_COUNT};
