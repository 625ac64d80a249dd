use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use office_ladder::{
    matches::models::{MatchModel, MatchType, ParticipantRole, PlayerDelta},
    player::{
        models::{NewPlayer, PlayerId, PlayerModel},
        InMemoryPlayerStore, MatchTransaction, PlayerStore,
    },
    AppError,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Store that counts every call before delegating to an in-memory store
#[derive(Clone)]
pub struct CountingStore {
    inner: Arc<InMemoryPlayerStore>,
    calls: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: Arc<InMemoryPlayerStore>) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlayerStore for CountingStore {
    async fn find_players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<PlayerModel>, AppError> {
        self.count();
        self.inner.find_players_by_ids(ids).await
    }

    async fn list_players_ordered_by_rating(&self) -> Result<Vec<PlayerModel>, AppError> {
        self.count();
        self.inner.list_players_ordered_by_rating().await
    }

    async fn list_players_ordered_by_name(&self) -> Result<Vec<PlayerModel>, AppError> {
        self.count();
        self.inner.list_players_ordered_by_name().await
    }

    async fn find_player_by_name_case_insensitive(
        &self,
        name: &str,
    ) -> Result<Option<PlayerModel>, AppError> {
        self.count();
        self.inner.find_player_by_name_case_insensitive(name).await
    }

    async fn create_player(&self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        self.count();
        self.inner.create_player(player).await
    }

    async fn begin_match_transaction(&self) -> Result<Box<dyn MatchTransaction>, AppError> {
        self.count();
        self.inner.begin_match_transaction().await
    }
}

/// Store whose match transactions always fail to commit
#[derive(Clone)]
pub struct FailingCommitStore {
    inner: Arc<InMemoryPlayerStore>,
}

impl FailingCommitStore {
    pub fn new(inner: Arc<InMemoryPlayerStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl PlayerStore for FailingCommitStore {
    async fn find_players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<PlayerModel>, AppError> {
        self.inner.find_players_by_ids(ids).await
    }

    async fn list_players_ordered_by_rating(&self) -> Result<Vec<PlayerModel>, AppError> {
        self.inner.list_players_ordered_by_rating().await
    }

    async fn list_players_ordered_by_name(&self) -> Result<Vec<PlayerModel>, AppError> {
        self.inner.list_players_ordered_by_name().await
    }

    async fn find_player_by_name_case_insensitive(
        &self,
        name: &str,
    ) -> Result<Option<PlayerModel>, AppError> {
        self.inner.find_player_by_name_case_insensitive(name).await
    }

    async fn create_player(&self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        self.inner.create_player(player).await
    }

    async fn begin_match_transaction(&self) -> Result<Box<dyn MatchTransaction>, AppError> {
        let inner = self.inner.begin_match_transaction().await?;
        Ok(Box::new(FailingCommitTransaction { inner }))
    }
}

struct FailingCommitTransaction {
    inner: Box<dyn MatchTransaction>,
}

#[async_trait]
impl MatchTransaction for FailingCommitTransaction {
    async fn find_players_by_ids(
        &mut self,
        ids: &[PlayerId],
    ) -> Result<Vec<PlayerModel>, AppError> {
        self.inner.find_players_by_ids(ids).await
    }

    async fn create_match_with_participants_and_update_players(
        &mut self,
        match_type: MatchType,
        participants: &[(PlayerId, ParticipantRole)],
        player_deltas: &[PlayerDelta],
    ) -> Result<MatchModel, AppError> {
        self.inner
            .create_match_with_participants_and_update_players(
                match_type,
                participants,
                player_deltas,
            )
            .await
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        // Dropping the inner transaction rolls it back
        drop(self.inner);
        Err(AppError::DatabaseError(
            "could not serialize access due to concurrent update".to_string(),
        ))
    }
}
