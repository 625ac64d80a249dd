use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, instrument, warn};

use super::models::{NewPlayer, PlayerId, PlayerModel};
use crate::matches::models::{
    MatchId, MatchModel, MatchParticipantModel, MatchType, ParticipantRole, PlayerDelta,
};
use crate::shared::AppError;

/// Durable storage for players and matches
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Players whose id is in `ids`, ordered by id. Unknown ids are skipped.
    async fn find_players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<PlayerModel>, AppError>;
    async fn list_players_ordered_by_rating(&self) -> Result<Vec<PlayerModel>, AppError>;
    async fn list_players_ordered_by_name(&self) -> Result<Vec<PlayerModel>, AppError>;
    async fn find_player_by_name_case_insensitive(
        &self,
        name: &str,
    ) -> Result<Option<PlayerModel>, AppError>;

    /// Fails with `AppError::Conflict` when the name is already taken (ignoring case)
    async fn create_player(&self, player: &NewPlayer) -> Result<PlayerModel, AppError>;

    /// Opens the unit of work that records one match
    async fn begin_match_transaction(&self) -> Result<Box<dyn MatchTransaction>, AppError>;
}

/// Transactional unit of work for recording matches.
///
/// Nothing written through the transaction is visible to other readers until
/// `commit` succeeds. Dropping the transaction without committing discards
/// every staged write.
#[async_trait]
pub trait MatchTransaction: Send {
    /// Locks the given player rows until the transaction ends and returns
    /// their latest committed state, ordered by id.
    ///
    /// Lock every row in a single call: rows are taken in ascending id order,
    /// which only prevents deadlocks if no lock is already held.
    async fn find_players_by_ids(
        &mut self,
        ids: &[PlayerId],
    ) -> Result<Vec<PlayerModel>, AppError>;

    /// Inserts the match and its participant rows and applies the rating,
    /// win and loss increments to the locked player rows.
    async fn create_match_with_participants_and_update_players(
        &mut self,
        match_type: MatchType,
        participants: &[(PlayerId, ParticipantRole)],
        player_deltas: &[PlayerDelta],
    ) -> Result<MatchModel, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

#[derive(Debug)]
struct StoreState {
    players: BTreeMap<PlayerId, PlayerModel>,
    matches: Vec<MatchModel>,
    next_player_id: PlayerId,
    next_match_id: MatchId,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            players: BTreeMap::new(),
            matches: Vec::new(),
            next_player_id: 1,
            next_match_id: 1,
        }
    }
}

impl StoreState {
    fn insert_player(&mut self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        let wanted = player.name.to_lowercase();
        if let Some(existing) = self
            .players
            .values()
            .find(|p| p.name.to_lowercase() == wanted)
        {
            warn!(name = %player.name, "Player name already exists in memory");
            return Err(AppError::name_taken(&existing.name));
        }

        let model = PlayerModel {
            id: self.next_player_id,
            name: player.name.clone(),
            elo_rating: player.elo_rating,
            wins: player.wins,
            losses: player.losses,
            created_at: Utc::now(),
        };
        self.next_player_id += 1;
        self.players.insert(model.id, model.clone());

        Ok(model)
    }
}

type RowLocks = Arc<RwLock<HashMap<PlayerId, Arc<AsyncMutex<()>>>>>;

/// In-memory implementation of PlayerStore for development and testing
///
/// Each player row has its own async lock, so match transactions touching
/// disjoint players run concurrently while those sharing a player queue up.
/// Data is lost when the application restarts.
pub struct InMemoryPlayerStore {
    state: Arc<Mutex<StoreState>>,
    row_locks: RowLocks,
}

impl Default for InMemoryPlayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlayerStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            row_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates an in-memory store with pre-populated players, ids assigned from 1.
    /// Entries whose name is already taken are skipped.
    pub fn with_players(players: Vec<NewPlayer>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state();
            for player in &players {
                if let Err(e) = state.insert_player(player) {
                    warn!(error = %e, "Skipping seeded player");
                }
            }
        }
        store
    }

    /// Every committed match, oldest first
    pub fn matches(&self) -> Vec<MatchModel> {
        self.state().matches.clone()
    }

    pub fn match_count(&self) -> usize {
        self.state().matches.len()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    // Writers never panic mid-update, so a poisoned guard still holds consistent data.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn row_lock(row_locks: &RowLocks, player_id: PlayerId) -> Arc<AsyncMutex<()>> {
    {
        let guard = row_locks.read().await;
        if let Some(lock) = guard.get(&player_id) {
            return lock.clone();
        }
    }

    let mut guard = row_locks.write().await;
    guard
        .entry(player_id)
        .or_insert_with(|| Arc::new(AsyncMutex::new(())))
        .clone()
}

fn sorted_unique(ids: &[PlayerId]) -> Vec<PlayerId> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[async_trait]
impl PlayerStore for InMemoryPlayerStore {
    #[instrument(skip(self))]
    async fn find_players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<PlayerModel>, AppError> {
        debug!("Fetching players from memory");

        let state = self.state();
        let players = sorted_unique(ids)
            .into_iter()
            .filter_map(|id| state.players.get(&id).cloned())
            .collect();

        Ok(players)
    }

    #[instrument(skip(self))]
    async fn list_players_ordered_by_rating(&self) -> Result<Vec<PlayerModel>, AppError> {
        let mut players: Vec<PlayerModel> = self.state().players.values().cloned().collect();
        players.sort_by(|a, b| b.elo_rating.cmp(&a.elo_rating).then(a.id.cmp(&b.id)));

        debug!(player_count = players.len(), "Listed players by rating");
        Ok(players)
    }

    #[instrument(skip(self))]
    async fn list_players_ordered_by_name(&self) -> Result<Vec<PlayerModel>, AppError> {
        let mut players: Vec<PlayerModel> = self.state().players.values().cloned().collect();
        players.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        debug!(player_count = players.len(), "Listed players by name");
        Ok(players)
    }

    #[instrument(skip(self))]
    async fn find_player_by_name_case_insensitive(
        &self,
        name: &str,
    ) -> Result<Option<PlayerModel>, AppError> {
        let wanted = name.to_lowercase();
        let state = self.state();

        Ok(state
            .players
            .values()
            .find(|p| p.name.to_lowercase() == wanted)
            .cloned())
    }

    #[instrument(skip(self, player), fields(name = %player.name))]
    async fn create_player(&self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        let created = self.state().insert_player(player)?;

        debug!(player_id = created.id, "Player created in memory");
        Ok(created)
    }

    async fn begin_match_transaction(&self) -> Result<Box<dyn MatchTransaction>, AppError> {
        Ok(Box::new(InMemoryMatchTransaction {
            state: Arc::clone(&self.state),
            row_locks: Arc::clone(&self.row_locks),
            held: BTreeMap::new(),
            staged_matches: Vec::new(),
            staged_deltas: Vec::new(),
        }))
    }
}

/// Match transaction over [`InMemoryPlayerStore`]: row locks are held until the
/// transaction is committed or dropped, and writes are applied in one step on commit.
pub struct InMemoryMatchTransaction {
    state: Arc<Mutex<StoreState>>,
    row_locks: RowLocks,
    held: BTreeMap<PlayerId, OwnedMutexGuard<()>>,
    staged_matches: Vec<MatchModel>,
    staged_deltas: Vec<PlayerDelta>,
}

#[async_trait]
impl MatchTransaction for InMemoryMatchTransaction {
    #[instrument(skip(self))]
    async fn find_players_by_ids(
        &mut self,
        ids: &[PlayerId],
    ) -> Result<Vec<PlayerModel>, AppError> {
        let ids = sorted_unique(ids);

        for id in &ids {
            if self.held.contains_key(id) {
                continue;
            }
            let lock = row_lock(&self.row_locks, *id).await;
            let guard = lock.lock_owned().await;
            self.held.insert(*id, guard);
        }
        debug!(locked_rows = self.held.len(), "Player rows locked");

        let state = lock_state(&self.state);
        Ok(ids
            .into_iter()
            .filter_map(|id| state.players.get(&id).cloned())
            .collect())
    }

    #[instrument(skip(self, participants, player_deltas))]
    async fn create_match_with_participants_and_update_players(
        &mut self,
        match_type: MatchType,
        participants: &[(PlayerId, ParticipantRole)],
        player_deltas: &[PlayerDelta],
    ) -> Result<MatchModel, AppError> {
        if let Some(unlocked) = player_deltas
            .iter()
            .find(|delta| !self.held.contains_key(&delta.player_id))
        {
            warn!(
                player_id = unlocked.player_id,
                "Update to a player row outside the transaction's locks"
            );
            return Err(AppError::DatabaseError(format!(
                "player {} is not locked by this transaction",
                unlocked.player_id
            )));
        }

        let match_id = {
            let mut state = lock_state(&self.state);
            let id = state.next_match_id;
            state.next_match_id += 1;
            id
        };

        let model = MatchModel {
            id: match_id,
            match_type,
            created_at: Utc::now(),
            participants: participants
                .iter()
                .map(|(player_id, role)| MatchParticipantModel {
                    match_id,
                    player_id: *player_id,
                    role: *role,
                })
                .collect(),
        };

        self.staged_matches.push(model.clone());
        self.staged_deltas.extend_from_slice(player_deltas);

        debug!(match_id, "Match staged in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let mut state = lock_state(&self.state);

        let missing: Vec<PlayerId> = self
            .staged_deltas
            .iter()
            .map(|delta| delta.player_id)
            .filter(|id| !state.players.contains_key(id))
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Players vanished before commit");
            return Err(AppError::PlayersNotFound(missing));
        }

        for delta in &self.staged_deltas {
            if let Some(player) = state.players.get_mut(&delta.player_id) {
                player.elo_rating += delta.rating_delta;
                player.wins += delta.win_delta;
                player.losses += delta.loss_delta;
            }
        }
        state.matches.extend(self.staged_matches.iter().cloned());

        info!(
            matches = self.staged_matches.len(),
            updated_players = self.staged_deltas.len(),
            "Match transaction committed in memory"
        );
        Ok(())
    }
}
