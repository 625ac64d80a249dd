use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use office_ladder::{
    player::{models::NewPlayer, InMemoryPlayerStore, PlayerStore},
    router, AppState, MatchRecorder,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const ADMIN_SECRET: &str = "test-secret";

pub struct TestSetup {
    pub store: Arc<InMemoryPlayerStore>,
    pub recorder: Arc<MatchRecorder>,
    pub app: Router,
}

impl TestSetup {
    /// Sends a request through a fresh clone of the router
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn rating_of(&self, id: i64) -> i32 {
        self.store.find_players_by_ids(&[id]).await.unwrap()[0].elo_rating
    }
}

pub struct TestSetupBuilder {
    players: Vec<NewPlayer>,
    players_store: Option<Arc<InMemoryPlayerStore>>,
    store_override: Option<Arc<dyn PlayerStore>>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            players_store: None,
            store_override: None,
        }
    }

    pub fn with_rated_players(mut self, players: &[(&str, i32)]) -> Self {
        self.players = players
            .iter()
            .map(|(name, rating)| NewPlayer::with_record(*name, *rating, 0, 0))
            .collect();
        self
    }

    pub fn with_four_players(self) -> Self {
        self.with_rated_players(&[
            ("alice", 1000),
            ("bob", 1000),
            ("charlie", 1000),
            ("david", 1000),
        ])
    }

    /// Routes the recorder and router through a wrapper around the seeded store.
    /// Call after the player list is set.
    pub fn with_store_wrapper(
        mut self,
        wrap: impl FnOnce(Arc<InMemoryPlayerStore>) -> Arc<dyn PlayerStore>,
    ) -> Self {
        let store = Arc::new(InMemoryPlayerStore::with_players(std::mem::take(
            &mut self.players,
        )));
        self.store_override = Some(wrap(store.clone()));
        self.players_store = Some(store);
        self
    }

    pub fn build(self) -> TestSetup {
        let store = self
            .players_store
            .unwrap_or_else(|| Arc::new(InMemoryPlayerStore::with_players(self.players)));
        let facade = self
            .store_override
            .unwrap_or_else(|| store.clone() as Arc<dyn PlayerStore>);

        let recorder = Arc::new(MatchRecorder::new(facade.clone()));
        let app = router(AppState::new(facade, Some(ADMIN_SECRET.to_string())));

        TestSetup {
            store,
            recorder,
            app,
        }
    }
}
