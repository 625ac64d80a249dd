use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{PlayerId, PlayerModel};

/// Request payload for adding a player
#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: Option<Value>,
}

impl CreatePlayerRequest {
    /// The submitted name, if it is a string
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }
}

/// Roster entry as returned by the admin endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: PlayerId,
    pub name: String,
    pub elo_rating: i32,
    pub wins: i32,
    pub losses: i32,
}

impl From<PlayerModel> for PlayerResponse {
    fn from(player: PlayerModel) -> Self {
        Self {
            id: player.id,
            name: player.name,
            elo_rating: player.elo_rating,
            wins: player.wins,
            losses: player.losses,
        }
    }
}
