use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::player::models::{PlayerId, PlayerModel};

/// One leaderboard row, derived on every read and never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRow {
    pub id: PlayerId,
    pub name: String,
    pub elo_rating: i32,
    pub wins: i32,
    pub losses: i32,
    pub win_rate: i32,
    pub rank: usize,
}

/// Wins as a rounded integer percentage of matches played; 0 with no matches.
pub fn win_rate(wins: i32, losses: i32) -> i32 {
    let total = i64::from(wins) + i64::from(losses);
    if total <= 0 {
        return 0;
    }
    // floor(100 * wins / total + 1/2) without going through floats
    ((200 * i64::from(wins) + total) / (2 * total)) as i32
}

// Rating descending; ties broken by name (ignoring case), then id.
fn standings_order(a: &PlayerModel, b: &PlayerModel) -> Ordering {
    b.elo_rating
        .cmp(&a.elo_rating)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Orders players into leaderboard rows.
///
/// Equal ratings share a rank and the next distinct rating takes its
/// 1-based position, so `[1300, 1300, 1200]` ranks as `[1, 1, 3]`.
pub fn compute_standings(players: &[PlayerModel]) -> Vec<RankedRow> {
    let mut sorted: Vec<&PlayerModel> = players.iter().collect();
    sorted.sort_by(|a, b| standings_order(a, b));

    let mut rows: Vec<RankedRow> = Vec::with_capacity(sorted.len());
    for (index, player) in sorted.into_iter().enumerate() {
        let rank = match rows.last() {
            Some(previous) if previous.elo_rating == player.elo_rating => previous.rank,
            _ => index + 1,
        };

        rows.push(RankedRow {
            id: player.id,
            name: player.name.clone(),
            elo_rating: player.elo_rating,
            wins: player.wins,
            losses: player.losses,
            win_rate: win_rate(player.wins, player.losses),
            rank,
        });
    }

    rows
}
