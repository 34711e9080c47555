//! Domain module
//!
//! Schema, field mapping and completion logic plus the profile aggregates.

pub mod aggregates;
pub mod alias;
pub mod events;
pub mod schema;
pub mod services;
pub mod value_objects;

pub use aggregates::*;
pub use events::*;
pub use schema::*;
pub use value_objects::*;
