use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{NewPlayer, PlayerId, PlayerModel},
    repository::{MatchTransaction, PlayerStore},
};
use crate::matches::models::{
    MatchModel, MatchParticipantModel, MatchType, ParticipantRole, PlayerDelta,
};
use crate::shared::AppError;

const PLAYER_COLUMNS: &str = "id, name, elo_rating, wins, losses, created_at";

// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL implementation of PlayerStore (schema in `sql/schema.sql`)
pub struct PostgresPlayerStore {
    pool: PgPool,
}

impl PostgresPlayerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, "{}", context);
        AppError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl PlayerStore for PostgresPlayerStore {
    #[instrument(skip(self))]
    async fn find_players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<PlayerModel>, AppError> {
        debug!("Fetching players from database");

        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to fetch players by id"))
    }

    #[instrument(skip(self))]
    async fn list_players_ordered_by_rating(&self) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY elo_rating DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to list players by rating"))
    }

    #[instrument(skip(self))]
    async fn list_players_ordered_by_name(&self) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to list players by name"))
    }

    #[instrument(skip(self))]
    async fn find_player_by_name_case_insensitive(
        &self,
        name: &str,
    ) -> Result<Option<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE lower(name) = lower($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to look up player by name"))
    }

    #[instrument(skip(self, player), fields(name = %player.name))]
    async fn create_player(&self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        let created = sqlx::query_as::<_, PlayerModel>(&format!(
            "INSERT INTO players (name, elo_rating, wins, losses) VALUES ($1, $2, $3, $4) \
             RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(&player.name)
        .bind(player.elo_rating)
        .bind(player.wins)
        .bind(player.losses)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(created) => {
                debug!(player_id = created.id, "Player created in database");
                Ok(created)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Player name already exists in database");
                // The index caught a concurrent insert; report the stored spelling
                let existing = self
                    .find_player_by_name_case_insensitive(&player.name)
                    .await?;
                let existing_name = existing
                    .as_ref()
                    .map_or(player.name.as_str(), |p| p.name.as_str());
                Err(AppError::name_taken(existing_name))
            }
            Err(e) => Err(database_error("Failed to create player")(e)),
        }
    }

    async fn begin_match_transaction(&self) -> Result<Box<dyn MatchTransaction>, AppError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("Failed to begin match transaction"))?;

        Ok(Box::new(PostgresMatchTransaction { tx }))
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Match transaction backed by a `sqlx` transaction. Row locks come from
/// `SELECT ... FOR UPDATE`; dropping without commit issues a rollback.
pub struct PostgresMatchTransaction {
    tx: Transaction<'static, Postgres>,
}

fn participant_from_row(row: &PgRow) -> Result<MatchParticipantModel, AppError> {
    let role: String = row.try_get("role")?;
    Ok(MatchParticipantModel {
        match_id: row.try_get("match_id")?,
        player_id: row.try_get("player_id")?,
        role: ParticipantRole::from_str(&role)
            .map_err(|_| AppError::DatabaseError(format!("unknown participant role {role}")))?,
    })
}

#[async_trait]
impl MatchTransaction for PostgresMatchTransaction {
    #[instrument(skip(self))]
    async fn find_players_by_ids(
        &mut self,
        ids: &[PlayerId],
    ) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(database_error("Failed to lock player rows"))
    }

    #[instrument(skip(self, participants, player_deltas))]
    async fn create_match_with_participants_and_update_players(
        &mut self,
        match_type: MatchType,
        participants: &[(PlayerId, ParticipantRole)],
        player_deltas: &[PlayerDelta],
    ) -> Result<MatchModel, AppError> {
        let row =
            sqlx::query("INSERT INTO matches (match_type) VALUES ($1) RETURNING id, created_at")
                .bind(match_type.to_string())
                .fetch_one(&mut *self.tx)
                .await
                .map_err(database_error("Failed to insert match"))?;
        let match_id: i64 = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        let mut inserted = Vec::with_capacity(participants.len());
        for (player_id, role) in participants {
            let row = sqlx::query(
                "INSERT INTO match_players (match_id, player_id, role) VALUES ($1, $2, $3) \
                 RETURNING match_id, player_id, role",
            )
            .bind(match_id)
            .bind(player_id)
            .bind(role.to_string())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(database_error("Failed to insert match participant"))?;
            inserted.push(participant_from_row(&row)?);
        }

        for delta in player_deltas {
            let result = sqlx::query(
                "UPDATE players SET elo_rating = elo_rating + $2, wins = wins + $3, \
                 losses = losses + $4 WHERE id = $1",
            )
            .bind(delta.player_id)
            .bind(delta.rating_delta)
            .bind(delta.win_delta)
            .bind(delta.loss_delta)
            .execute(&mut *self.tx)
            .await
            .map_err(database_error("Failed to update player"))?;

            if result.rows_affected() == 0 {
                warn!(player_id = delta.player_id, "Player row missing during update");
                return Err(AppError::PlayersNotFound(vec![delta.player_id]));
            }
        }

        debug!(match_id, "Match inserted in transaction");
        Ok(MatchModel {
            id: match_id,
            match_type,
            created_at,
            participants: inserted,
        })
    }

    #[instrument(skip(self))]
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx
            .commit()
            .await
            .map_err(database_error("Failed to commit match transaction"))?;

        info!("Match transaction committed in database");
        Ok(())
    }
}
