use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{NewPlayer, PlayerModel},
    repository::PlayerStore,
};
use crate::shared::AppError;

/// Service for roster management: listing and adding players
pub struct RosterService {
    store: Arc<dyn PlayerStore>,
}

impl RosterService {
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        Self { store }
    }

    /// All players, sorted by name
    #[instrument(skip(self))]
    pub async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError> {
        self.store.list_players_ordered_by_name().await
    }

    /// Adds a player at the default rating.
    ///
    /// The name is trimmed and must be unique ignoring case.
    #[instrument(skip(self))]
    pub async fn create_player(&self, name: &str) -> Result<PlayerModel, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "name is required and must not be empty".to_string(),
            ));
        }

        if let Some(existing) = self.store.find_player_by_name_case_insensitive(name).await? {
            warn!(name = %name, existing = %existing.name, "Duplicate player name");
            return Err(AppError::name_taken(&existing.name));
        }

        let player = self.store.create_player(&NewPlayer::new(name)).await?;

        info!(player_id = player.id, name = %player.name, "Player added to roster");
        Ok(player)
    }
}
