// Public API - what other modules can use
pub use handlers::leaderboard;
pub use standings::{compute_standings, win_rate, RankedRow};

// Internal modules
mod handlers;
mod standings;
