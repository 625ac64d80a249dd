use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::rating::DEFAULT_ELO_RATING;

pub type PlayerId = i64;

/// Database model for players table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PlayerModel {
    pub id: PlayerId,
    pub name: String, // Unique, compared case-insensitively
    pub elo_rating: i32,
    pub wins: i32,
    pub losses: i32,
    pub created_at: DateTime<Utc>,
}

impl PlayerModel {
    pub fn matches_played(&self) -> i32 {
        self.wins + self.losses
    }
}

/// Insert payload for a player row; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayer {
    pub name: String,
    pub elo_rating: i32,
    pub wins: i32,
    pub losses: i32,
}

impl NewPlayer {
    /// A fresh roster entry at the default rating with no matches played
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elo_rating: DEFAULT_ELO_RATING,
            wins: 0,
            losses: 0,
        }
    }

    pub fn with_record(name: impl Into<String>, elo_rating: i32, wins: i32, losses: i32) -> Self {
        Self {
            name: name.into(),
            elo_rating,
            wins,
            losses,
        }
    }
}

/// Demo roster loaded when `SEED_DEMO_ROSTER` is set.
pub fn demo_roster() -> Vec<NewPlayer> {
    vec![
        NewPlayer::with_record("Alice", 1320, 18, 5),
        NewPlayer::with_record("Bob", 1185, 10, 9),
        NewPlayer::with_record("Carol", 1142, 7, 8),
        NewPlayer::with_record("Dave", 1076, 4, 11),
        NewPlayer::with_record("Eve", 998, 3, 12),
        NewPlayer::with_record("Frank", 1250, 14, 6),
    ]
}
