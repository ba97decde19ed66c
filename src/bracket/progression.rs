//! Match result recording and winner propagation
//!
//! `MatchProgressionEngine` drives the post-result sequence: complete the
//! match, apply ratings, push the winner into the next round's slot, and
//! emit the events the notification pipeline consumes. Completion is a
//! conditional update and a rating failure rolls the match row back, so a
//! result is either fully recorded or not recorded at all.

use crate::error::{Result, TournamentError};
use crate::events::publisher::EventPublisher;
use crate::events::{MatchCompleted, RankTierChanged, TournamentCompleted};
use crate::rating::engine::{AppliedRating, RatingEngine, RatingTransition};
use crate::storage::{MatchCompletion, MatchStore, SlotFill, TournamentStore};
use crate::types::{BracketMatch, MatchId, MatchStatus, PlayerId, TournamentId};
use crate::utils::{current_timestamp, propagation_target};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything that happened when a result was recorded
#[derive(Debug, Clone)]
pub struct RecordedResult {
    pub match_row: BracketMatch,
    pub rating: AppliedRating,
    /// The tournament's final match just completed
    pub tournament_completed: bool,
}

/// Records match results and advances winners through the bracket
pub struct MatchProgressionEngine {
    tournaments: Arc<dyn TournamentStore>,
    matches: Arc<dyn MatchStore>,
    rating_engine: RatingEngine,
    event_publisher: Arc<dyn EventPublisher>,
}

impl MatchProgressionEngine {
    pub fn new(
        tournaments: Arc<dyn TournamentStore>,
        matches: Arc<dyn MatchStore>,
        rating_engine: RatingEngine,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            tournaments,
            matches,
            rating_engine,
            event_publisher,
        }
    }

    /// Record a decided match's score line.
    ///
    /// The winner is the participant with the strictly higher score; ties
    /// and negative scores are rejected before anything is written.
    /// Re-invoking on a completed match is rejected with `MatchNotReady`
    /// and changes no rating.
    ///
    /// A rating failure restores the match row, so the whole call can be
    /// retried. A storage failure during winner propagation surfaces after
    /// the match and ratings are already committed; replays are rejected
    /// at that point, so the next-round slot needs operator-level repair
    /// at the storage layer.
    pub async fn record_result(
        &self,
        match_id: MatchId,
        score1: i32,
        score2: i32,
    ) -> Result<RecordedResult> {
        let match_row =
            self.matches
                .get_match(&match_id)?
                .ok_or(TournamentError::MatchNotFound {
                    match_id: match_id.to_string(),
                })?;

        if match_row.status == MatchStatus::Completed {
            return Err(TournamentError::MatchNotReady {
                match_id: match_id.to_string(),
                reason: "match is already completed".to_string(),
            }
            .into());
        }

        let (participant1, participant2) = match (&match_row.participant1, &match_row.participant2)
        {
            (Some(p1), Some(p2)) => (p1.clone(), p2.clone()),
            _ => {
                return Err(TournamentError::MatchNotReady {
                    match_id: match_id.to_string(),
                    reason: "both participant slots must be filled".to_string(),
                }
                .into())
            }
        };

        if score1 < 0 || score2 < 0 {
            return Err(TournamentError::InvalidScore {
                match_id: match_id.to_string(),
                reason: format!("scores cannot be negative ({}-{})", score1, score2),
            }
            .into());
        }
        if score1 == score2 {
            return Err(TournamentError::InvalidScore {
                match_id: match_id.to_string(),
                reason: format!("scores are tied ({}-{}); resolve the tie first", score1, score2),
            }
            .into());
        }

        let (winner, loser) = if score1 > score2 {
            (participant1, participant2)
        } else {
            (participant2, participant1)
        };

        let tournament = self
            .tournaments
            .get_tournament(&match_row.tournament_id)?
            .ok_or(TournamentError::TournamentNotFound {
                tournament_id: match_row.tournament_id.to_string(),
            })?;

        info!(
            "Recording result for match {} (round {}, match {}): {} beats {} {}-{}",
            match_id, match_row.round, match_row.match_number, winner, loser, score1, score2
        );

        let completed = self.matches.complete_match(
            &match_id,
            MatchCompletion {
                winner: winner.clone(),
                score1: Some(score1 as u32),
                score2: Some(score2 as u32),
                completed_at: current_timestamp(),
            },
        )?;
        if !completed {
            // A concurrent caller won the conditional update
            return Err(TournamentError::MatchNotReady {
                match_id: match_id.to_string(),
                reason: "match is already completed".to_string(),
            }
            .into());
        }

        let rating = match self.rating_engine.apply_match_result(
            match_id,
            &winner,
            &loser,
            tournament.game_id,
        ) {
            Ok(rating) => rating,
            Err(err) => {
                // Leave no completed match with unapplied ratings: put the
                // row back and let the caller retry the whole operation.
                warn!(
                    "Rating application failed for match {}; restoring match row: {}",
                    match_id, err
                );
                self.matches.restore_match(match_row)?;
                return Err(err);
            }
        };

        self.propagate_winner(&match_row, &winner)?;

        let tournament_completed = self.is_final_match(&match_row)?;

        let updated_row =
            self.matches
                .get_match(&match_id)?
                .ok_or(TournamentError::MatchNotFound {
                    match_id: match_id.to_string(),
                })?;

        self.event_publisher
            .publish_match_completed(MatchCompleted {
                tournament_id: match_row.tournament_id,
                match_id,
                round: match_row.round,
                match_number: match_row.match_number,
                winner: winner.clone(),
                loser,
                score1: score1 as u32,
                score2: score2 as u32,
                timestamp: current_timestamp(),
            })
            .await?;

        for transition in [&rating.winner, &rating.loser] {
            self.publish_tier_change(tournament.game_id, transition)
                .await?;
        }

        if tournament_completed {
            info!(
                "Tournament {} completed; champion: {}",
                match_row.tournament_id, winner
            );
            self.event_publisher
                .publish_tournament_completed(TournamentCompleted {
                    tournament_id: match_row.tournament_id,
                    game_id: tournament.game_id,
                    champion: winner,
                    timestamp: current_timestamp(),
                })
                .await?;
        }

        Ok(RecordedResult {
            match_row: updated_row,
            rating,
            tournament_completed,
        })
    }

    /// Resolve every unplayed round-1 bye as a walkover and propagate the
    /// advancing players. Walkovers carry no scores and move no ratings —
    /// there was no opponent. Explicit organizer action, never implicit.
    pub async fn advance_byes(&self, tournament_id: TournamentId) -> Result<Vec<BracketMatch>> {
        let matches = self.matches.matches_for_tournament(&tournament_id)?;
        let mut advanced = Vec::new();

        for match_row in matches
            .iter()
            .filter(|m| m.round == 1 && m.status != MatchStatus::Completed && m.is_bye())
        {
            let Some(winner) = match_row
                .participant1
                .clone()
                .or_else(|| match_row.participant2.clone())
            else {
                continue;
            };

            let completed = self.matches.complete_match(
                &match_row.id,
                MatchCompletion {
                    winner: winner.clone(),
                    score1: None,
                    score2: None,
                    completed_at: current_timestamp(),
                },
            )?;
            if !completed {
                continue;
            }

            debug!(
                "Walkover: {} advances from round 1 match {} of tournament {}",
                winner, match_row.match_number, tournament_id
            );
            self.propagate_winner(match_row, &winner)?;

            if let Some(updated) = self.matches.get_match(&match_row.id)? {
                advanced.push(updated);
            }
        }

        if !advanced.is_empty() {
            info!(
                "Advanced {} bye(s) for tournament {}",
                advanced.len(),
                tournament_id
            );
        }
        Ok(advanced)
    }

    /// Administrative: flag a match as being played
    pub fn mark_in_progress(&self, match_id: MatchId) -> Result<()> {
        self.set_administrative_status(match_id, MatchStatus::InProgress)
    }

    /// Administrative: flag a match as disputed
    pub fn mark_disputed(&self, match_id: MatchId) -> Result<()> {
        self.set_administrative_status(match_id, MatchStatus::Disputed)
    }

    fn set_administrative_status(&self, match_id: MatchId, status: MatchStatus) -> Result<()> {
        let match_row =
            self.matches
                .get_match(&match_id)?
                .ok_or(TournamentError::MatchNotFound {
                    match_id: match_id.to_string(),
                })?;
        if match_row.status == MatchStatus::Completed {
            return Err(TournamentError::MatchNotReady {
                match_id: match_id.to_string(),
                reason: format!("cannot move a completed match to {}", status),
            }
            .into());
        }
        self.matches.set_match_status(&match_id, status)?;
        Ok(())
    }

    /// Push the winner into the next round's slot. Missing target match
    /// (the final, or a bracket generated by older code) is a no-op.
    fn propagate_winner(&self, match_row: &BracketMatch, winner: &PlayerId) -> Result<()> {
        let (next_round, next_match_number, slot) =
            propagation_target(match_row.round, match_row.match_number);

        match self.matches.fill_slot(
            &match_row.tournament_id,
            next_round,
            next_match_number,
            slot,
            winner,
        )? {
            None => {
                debug!(
                    "No round {} match {} in tournament {}; propagation is a no-op",
                    next_round, next_match_number, match_row.tournament_id
                );
            }
            Some(SlotFill::Filled) => {
                debug!(
                    "{} advances to round {} match {} ({:?})",
                    winner, next_round, next_match_number, slot
                );
            }
            Some(SlotFill::AlreadyFilled(existing)) if existing == *winner => {
                debug!(
                    "Slot already holds {}; duplicate propagation ignored",
                    winner
                );
            }
            Some(SlotFill::AlreadyFilled(existing)) => {
                // First writer keeps the slot; this indicates a duplicated
                // or regenerated bracket and needs an operator's eyes.
                warn!(
                    "Slot conflict in tournament {}: round {} match {} {:?} already holds {}, \
                     refusing to overwrite with {}",
                    match_row.tournament_id, next_round, next_match_number, slot, existing, winner
                );
            }
        }
        Ok(())
    }

    /// A match is the final when it is match 1 of the last round
    fn is_final_match(&self, match_row: &BracketMatch) -> Result<bool> {
        if match_row.match_number != 1 {
            return Ok(false);
        }
        let successor =
            self.matches
                .find_match(&match_row.tournament_id, match_row.round + 1, 1)?;
        Ok(successor.is_none())
    }

    async fn publish_tier_change(
        &self,
        game_id: crate::types::GameId,
        transition: &RatingTransition,
    ) -> Result<()> {
        if !transition.tier_changed() {
            return Ok(());
        }
        self.event_publisher
            .publish_rank_tier_changed(RankTierChanged {
                player_id: transition.player_id.clone(),
                game_id,
                previous_tier: transition.tier_before,
                new_tier: transition.tier_after,
                elo_rating: transition.elo_after,
                timestamp: current_timestamp(),
            })
            .await
    }
}
