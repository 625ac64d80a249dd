use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::player::models::PlayerId;

pub type MatchId = i64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Singles,
    Doubles,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParticipantRole {
    Winner,
    Loser,
}

/// Database model for matches table, with its participant rows attached
#[derive(Debug, Clone, PartialEq)]
pub struct MatchModel {
    pub id: MatchId,
    pub match_type: MatchType,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<MatchParticipantModel>,
}

/// Database model for match_players table
#[derive(Debug, Clone, PartialEq)]
pub struct MatchParticipantModel {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub role: ParticipantRole,
}

/// Increments applied to one player row when a match is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDelta {
    pub player_id: PlayerId,
    pub rating_delta: i32,
    pub win_delta: i32,
    pub loss_delta: i32,
}

impl PlayerDelta {
    pub fn win(player_id: PlayerId, rating_delta: i32) -> Self {
        Self {
            player_id,
            rating_delta,
            win_delta: 1,
            loss_delta: 0,
        }
    }

    pub fn loss(player_id: PlayerId, rating_delta: i32) -> Self {
        Self {
            player_id,
            rating_delta,
            win_delta: 0,
            loss_delta: 1,
        }
    }
}

/// A submitted match result, before any rating has been computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Singles {
        winner_id: PlayerId,
        loser_id: PlayerId,
    },
    Doubles {
        winner_team: [PlayerId; 2],
        loser_team: [PlayerId; 2],
    },
}

impl MatchOutcome {
    pub fn match_type(&self) -> MatchType {
        match self {
            MatchOutcome::Singles { .. } => MatchType::Singles,
            MatchOutcome::Doubles { .. } => MatchType::Doubles,
        }
    }

    /// Every referenced player with its role, winners first
    pub fn participants(&self) -> Vec<(PlayerId, ParticipantRole)> {
        match self {
            MatchOutcome::Singles {
                winner_id,
                loser_id,
            } => vec![
                (*winner_id, ParticipantRole::Winner),
                (*loser_id, ParticipantRole::Loser),
            ],
            MatchOutcome::Doubles {
                winner_team,
                loser_team,
            } => winner_team
                .iter()
                .map(|id| (*id, ParticipantRole::Winner))
                .chain(loser_team.iter().map(|id| (*id, ParticipantRole::Loser)))
                .collect(),
        }
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.participants().into_iter().map(|(id, _)| id).collect()
    }

    /// Checks that no player appears twice in the match.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MatchOutcome::Singles {
                winner_id,
                loser_id,
            } => {
                if winner_id == loser_id {
                    return Err("winnerId and loserId must be different players".to_string());
                }
            }
            MatchOutcome::Doubles { .. } => {
                let mut ids = self.player_ids();
                ids.sort_unstable();
                ids.dedup();
                if ids.len() != 4 {
                    return Err("All four player IDs must be distinct".to_string());
                }
            }
        }
        Ok(())
    }
}
