// Public API - what other modules can use
pub use handlers::record_match;
pub use models::{MatchOutcome, MatchType, ParticipantRole};
pub use service::MatchRecorder;
pub use types::{MatchResult, RatingChange, RecordMatchRequest};

// Internal modules
mod handlers;
pub mod models;
pub mod service;
pub mod types;
