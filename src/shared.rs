use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::player::{models::PlayerId, repository::PlayerStore};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub player_store: Arc<dyn PlayerStore>,
    /// Shared secret guarding the roster admin routes. `None` disables them.
    pub admin_secret: Option<String>,
}

impl AppState {
    pub fn new(player_store: Arc<dyn PlayerStore>, admin_secret: Option<String>) -> Self {
        Self {
            player_store,
            admin_secret,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Player(s) not found: {}", join_ids(.0))]
    PlayersNotFound(Vec<PlayerId>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

fn join_ids(ids: &[PlayerId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Conflict naming the player that already holds the name, in its stored spelling
    pub fn name_taken(existing_name: &str) -> Self {
        AppError::Conflict(format!("A player named \"{existing_name}\" already exists"))
    }
}

/// Decodes a request body that must be a JSON object, whatever its content type.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::Validation("Invalid JSON".to_string()))?;
    if !value.is_object() {
        return Err(AppError::Validation("Invalid request body".to_string()));
    }

    serde_json::from_value(value)
        .map_err(|_| AppError::Validation("Invalid request body".to_string()))
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::PlayersNotFound(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_players_not_found_lists_ids_in_order() {
        let err = AppError::PlayersNotFound(vec![9, 3]);
        assert_eq!(err.to_string(), "Player(s) not found: 9, 3");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Player(s) not found: 9, 3");
    }

    #[test]
    fn test_parse_json_body_requires_an_object() {
        let array = parse_json_body::<Value>(b"[1, 2]");
        assert!(matches!(array, Err(AppError::Validation(msg)) if msg == "Invalid request body"));

        let broken = parse_json_body::<Value>(b"{\"name\":");
        assert!(matches!(broken, Err(AppError::Validation(msg)) if msg == "Invalid JSON"));

        let object: Value = parse_json_body(br#"{"name": "Alice"}"#).unwrap();
        assert_eq!(object["name"], "Alice");
    }

    #[test]
    fn test_name_taken_names_existing_player() {
        let err = AppError::name_taken("Alice");
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "A player named \"Alice\" already exists");
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("Not found".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                AppError::DatabaseError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
