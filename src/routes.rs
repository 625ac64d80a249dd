use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{admin, leaderboard, matches, shared::AppState};

/// Builds the HTTP router with every endpoint mounted
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/matches", post(matches::record_match))
        .route("/leaderboard", get(leaderboard::leaderboard))
        .route(
            "/admin/:secret/players",
            get(admin::list_players).post(admin::create_player),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
