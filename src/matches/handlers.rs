use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::MatchRecorder,
    types::{MatchResult, RecordMatchRequest},
};
use crate::shared::{parse_json_body, AppError, AppState};

/// HTTP handler for recording a match
///
/// POST /matches
/// Body: `{type: "SINGLES", winnerId, loserId}` or
/// `{type: "DOUBLES", winnerTeam: [id, id], loserTeam: [id, id]}`,
/// read as JSON regardless of the content type header
#[instrument(name = "record_match", skip(state, body))]
pub async fn record_match(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MatchResult>), AppError> {
    let request: RecordMatchRequest = parse_json_body(&body)?;
    let outcome = request.into_outcome()?;

    let recorder = MatchRecorder::new(Arc::clone(&state.player_store));
    let result = recorder.record_match(outcome).await?;

    info!(match_id = result.match_id(), "Match submission accepted");

    Ok((StatusCode::CREATED, Json(result)))
}
