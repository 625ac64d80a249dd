use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{MatchId, MatchOutcome};
use crate::player::models::{PlayerId, PlayerModel};
use crate::shared::AppError;

/// Rating movement of one player in a recorded match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub id: PlayerId,
    pub name: String,
    pub old_rating: i32,
    pub new_rating: i32,
    pub delta: i32,
}

impl RatingChange {
    pub fn new(player: &PlayerModel, new_rating: i32) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            old_rating: player.elo_rating,
            new_rating,
            delta: new_rating - player.elo_rating,
        }
    }
}

/// Response for a recorded match (POST /matches)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum MatchResult {
    Singles {
        match_id: MatchId,
        winner: RatingChange,
        loser: RatingChange,
    },
    Doubles {
        match_id: MatchId,
        winner_team: [RatingChange; 2],
        loser_team: [RatingChange; 2],
    },
}

impl MatchResult {
    pub fn match_id(&self) -> MatchId {
        match self {
            MatchResult::Singles { match_id, .. } | MatchResult::Doubles { match_id, .. } => {
                *match_id
            }
        }
    }
}

/// Request payload for recording a match (POST /matches)
///
/// Fields stay untyped so a wrong shape is reported with a specific message
/// instead of a generic decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMatchRequest {
    #[serde(rename = "type")]
    pub match_type: Option<Value>,
    pub winner_id: Option<Value>,
    pub loser_id: Option<Value>,
    pub winner_team: Option<Value>,
    pub loser_team: Option<Value>,
}

fn validation(msg: &str) -> AppError {
    AppError::Validation(msg.to_string())
}

fn player_id(value: &Option<Value>) -> Option<PlayerId> {
    value.as_ref().and_then(Value::as_i64)
}

fn team(value: &Option<Value>) -> Option<&[Value]> {
    value
        .as_ref()
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .filter(|ids| ids.len() == 2)
}

impl RecordMatchRequest {
    /// Checks the payload shape and converts it into a typed outcome.
    ///
    /// Repeated players are rejected later by [`MatchOutcome::validate`].
    pub fn into_outcome(self) -> Result<MatchOutcome, AppError> {
        match self.match_type.as_ref().and_then(Value::as_str) {
            Some("SINGLES") => match (player_id(&self.winner_id), player_id(&self.loser_id)) {
                (Some(winner_id), Some(loser_id)) => Ok(MatchOutcome::Singles {
                    winner_id,
                    loser_id,
                }),
                _ => Err(validation("winnerId and loserId must be numbers")),
            },
            Some("DOUBLES") => {
                let (Some(winners), Some(losers)) =
                    (team(&self.winner_team), team(&self.loser_team))
                else {
                    return Err(validation(
                        "winnerTeam and loserTeam must each be arrays of exactly 2 player IDs",
                    ));
                };

                let ids: Option<Vec<PlayerId>> =
                    winners.iter().chain(losers).map(Value::as_i64).collect();
                match ids.as_deref() {
                    Some(&[w1, w2, l1, l2]) => Ok(MatchOutcome::Doubles {
                        winner_team: [w1, w2],
                        loser_team: [l1, l2],
                    }),
                    _ => Err(validation("All player IDs must be numbers")),
                }
            }
            _ => Err(validation(
                "Unsupported match type. Use 'SINGLES' or 'DOUBLES'.",
            )),
        }
    }
}
