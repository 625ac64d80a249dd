use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::secret::validate_admin_secret;
use crate::{
    player::{
        service::RosterService,
        types::{CreatePlayerRequest, PlayerResponse},
    },
    shared::{parse_json_body, AppError, AppState},
};

/// HTTP handler for listing the roster
///
/// GET /admin/:secret/players
/// Returns all players sorted by name
#[instrument(name = "admin_list_players", skip(state, secret))]
pub async fn list_players(
    State(state): State<AppState>,
    Path(secret): Path<String>,
) -> Result<Json<Vec<PlayerResponse>>, AppError> {
    validate_admin_secret(state.admin_secret.as_deref(), &secret)?;

    let service = RosterService::new(Arc::clone(&state.player_store));
    let players: Vec<PlayerResponse> = service
        .list_players()
        .await?
        .into_iter()
        .map(PlayerResponse::from)
        .collect();

    info!(player_count = players.len(), "Roster listed");

    Ok(Json(players))
}

/// HTTP handler for adding a player
///
/// POST /admin/:secret/players
/// Body: `{name}`; the player starts at the default rating
#[instrument(name = "admin_create_player", skip(state, secret, body))]
pub async fn create_player(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<PlayerResponse>), AppError> {
    validate_admin_secret(state.admin_secret.as_deref(), &secret)?;

    let request: CreatePlayerRequest = parse_json_body(&body)?;
    let name = request.name().ok_or_else(|| {
        AppError::Validation("name is required and must not be empty".to_string())
    })?;

    let service = RosterService::new(Arc::clone(&state.player_store));
    let player = service.create_player(name).await?;

    Ok((StatusCode::CREATED, Json(player.into())))
}
