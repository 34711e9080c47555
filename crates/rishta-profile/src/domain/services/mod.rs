//! Domain services module

pub mod completion;
pub mod matching;
pub mod normalizer;
pub mod payload;

pub use completion::{percent, CompletionCalculator, CompletionReport, SectionCompletion};
pub use matching::{browse, CandidateSummary, MatchFilter, MatchSort};
pub use normalizer::FormNormalizer;
pub use payload::{PayloadTransformer, PASSTHROUGH_KEYS};
