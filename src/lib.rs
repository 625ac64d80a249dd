// Library crate for the office leaderboard server
// This file exposes the public API for integration tests

pub mod admin;
pub mod config;
pub mod leaderboard;
pub mod matches;
pub mod player;
pub mod rating;
pub mod routes;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use leaderboard::{compute_standings, RankedRow};
pub use matches::{MatchOutcome, MatchRecorder, MatchResult};
pub use player::{InMemoryPlayerStore, PlayerStore, PostgresPlayerStore};
pub use routes::router;
pub use shared::{AppError, AppState};
