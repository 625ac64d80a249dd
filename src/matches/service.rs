use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{MatchId, MatchOutcome, ParticipantRole, PlayerDelta},
    types::{MatchResult, RatingChange},
};
use crate::{
    player::{
        models::{PlayerId, PlayerModel},
        repository::PlayerStore,
    },
    rating::{compute_elo, doubles_delta},
    shared::AppError,
};

/// Records match outcomes and the rating updates they cause
pub struct MatchRecorder {
    store: Arc<dyn PlayerStore>,
}

impl MatchRecorder {
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        Self { store }
    }

    /// Validates the outcome, then inserts the match and applies every
    /// player's rating, win and loss change in one transaction.
    ///
    /// Ratings are re-read under row locks inside the transaction, so
    /// concurrent submissions sharing a player are applied one after another.
    #[instrument(skip(self), fields(match_type = %outcome.match_type()))]
    pub async fn record_match(&self, outcome: MatchOutcome) -> Result<MatchResult, AppError> {
        outcome.validate().map_err(|msg| {
            warn!(reason = %msg, "Rejected match submission");
            AppError::Validation(msg)
        })?;

        let ids = outcome.player_ids();
        let known = self.store.find_players_by_ids(&ids).await?;
        ensure_all_found(&ids, |id| known.iter().any(|p| p.id == id))?;

        let mut tx = self.store.begin_match_transaction().await?;
        let players: HashMap<PlayerId, PlayerModel> = tx
            .find_players_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        ensure_all_found(&ids, |id| players.contains_key(&id))?;

        let changes = rating_changes(&outcome, &players)?;
        let participants = outcome.participants();
        let deltas: Vec<PlayerDelta> = participants
            .iter()
            .zip(&changes)
            .map(|((player_id, role), change)| match role {
                ParticipantRole::Winner => PlayerDelta::win(*player_id, change.delta),
                ParticipantRole::Loser => PlayerDelta::loss(*player_id, change.delta),
            })
            .collect();

        let created = tx
            .create_match_with_participants_and_update_players(
                outcome.match_type(),
                &participants,
                &deltas,
            )
            .await?;

        if let Err(e) = tx.commit().await {
            warn!(error = %e, "Match recording failed, nothing was applied");
            return Err(e);
        }

        info!(
            match_id = created.id,
            players = changes.len(),
            "Match recorded"
        );

        into_result(created.id, outcome, changes)
    }
}

/// Fails with the ids (in submission order) that `is_known` rejects.
fn ensure_all_found(
    ids: &[PlayerId],
    is_known: impl Fn(PlayerId) -> bool,
) -> Result<(), AppError> {
    let missing: Vec<PlayerId> = ids.iter().copied().filter(|id| !is_known(*id)).collect();

    if missing.is_empty() {
        Ok(())
    } else {
        warn!(?missing, "Match references unknown players");
        Err(AppError::PlayersNotFound(missing))
    }
}

fn lookup(
    players: &HashMap<PlayerId, PlayerModel>,
    id: PlayerId,
) -> Result<&PlayerModel, AppError> {
    players
        .get(&id)
        .ok_or_else(|| AppError::PlayersNotFound(vec![id]))
}

/// New ratings for every participant, in `MatchOutcome::participants` order.
fn rating_changes(
    outcome: &MatchOutcome,
    players: &HashMap<PlayerId, PlayerModel>,
) -> Result<Vec<RatingChange>, AppError> {
    match outcome {
        MatchOutcome::Singles {
            winner_id,
            loser_id,
        } => {
            let winner = lookup(players, *winner_id)?;
            let loser = lookup(players, *loser_id)?;
            let update = compute_elo(winner.elo_rating, loser.elo_rating);

            Ok(vec![
                RatingChange::new(winner, update.new_winner_rating),
                RatingChange::new(loser, update.new_loser_rating),
            ])
        }
        MatchOutcome::Doubles {
            winner_team,
            loser_team,
        } => {
            let winners = [
                lookup(players, winner_team[0])?,
                lookup(players, winner_team[1])?,
            ];
            let losers = [
                lookup(players, loser_team[0])?,
                lookup(players, loser_team[1])?,
            ];
            let delta = doubles_delta(
                [winners[0].elo_rating, winners[1].elo_rating],
                [losers[0].elo_rating, losers[1].elo_rating],
            );

            let mut changes: Vec<RatingChange> = winners
                .iter()
                .map(|p| RatingChange::new(p, p.elo_rating + delta))
                .collect();
            changes.extend(
                losers
                    .iter()
                    .map(|p| RatingChange::new(p, p.elo_rating - delta)),
            );
            Ok(changes)
        }
    }
}

fn into_result(
    match_id: MatchId,
    outcome: MatchOutcome,
    changes: Vec<RatingChange>,
) -> Result<MatchResult, AppError> {
    let mut changes = changes.into_iter();
    let mut next = || changes.next().ok_or(AppError::Internal);

    match outcome {
        MatchOutcome::Singles { .. } => Ok(MatchResult::Singles {
            match_id,
            winner: next()?,
            loser: next()?,
        }),
        MatchOutcome::Doubles { .. } => Ok(MatchResult::Doubles {
            match_id,
            winner_team: [next()?, next()?],
            loser_team: [next()?, next()?],
        }),
    }
}
