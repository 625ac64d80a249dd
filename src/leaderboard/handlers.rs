use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::standings::{compute_standings, RankedRow};
use crate::shared::{AppError, AppState};

/// HTTP handler for the current standings
///
/// GET /leaderboard
/// Returns every player ordered by rating with rank and win rate
#[instrument(name = "leaderboard", skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedRow>>, AppError> {
    let players = state.player_store.list_players_ordered_by_rating().await?;
    let rows = compute_standings(&players);

    info!(player_count = rows.len(), "Leaderboard computed");

    Ok(Json(rows))
}
