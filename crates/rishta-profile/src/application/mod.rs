//! Application layer
//!
//! Orchestrates use cases over the remote API ports.

pub mod editor;
pub mod matches;
pub mod operation;
pub mod session;

pub use editor::{EditorError, LoadOutcome, ProfileEditor, SaveOutcome, PHOTOS_KEY, PRIMARY_PHOTO_KEY};
pub use matches::{MatchService, MatchServiceError};
pub use operation::{CompletionFlash, OperationState, RequestSequencer, FLASH_TTL_MS};
pub use session::{AuthError, AuthService, Session};
