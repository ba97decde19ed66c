//! Transactional rating application
//!
//! `RatingEngine` owns the whole apply-match-result sequence: lazy row
//! initialization, Elo delta computation, streak and peak bookkeeping,
//! and the atomic commit of both ranking rows plus their history entries.
//! The commit is idempotent keyed by match id; replays are reported, not
//! re-applied.

use crate::config::RatingSettings;
use crate::error::{Result, TournamentError};
use crate::rating::elo::EloCalculator;
use crate::rating::tiers::Tier;
use crate::storage::{CommitOutcome, RankingStore, RatingApplication};
use crate::types::{EloHistoryEntry, GameId, MatchId, PlayerId, PlayerRanking};
use crate::utils::current_timestamp;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One player's rating movement from a single application
#[derive(Debug, Clone)]
pub struct RatingTransition {
    pub player_id: PlayerId,
    pub elo_before: i32,
    pub elo_after: i32,
    pub tier_before: Tier,
    pub tier_after: Tier,
}

impl RatingTransition {
    fn from_elo(player_id: PlayerId, elo_before: i32, elo_after: i32) -> Self {
        Self {
            player_id,
            elo_before,
            elo_after,
            tier_before: Tier::classify(elo_before),
            tier_after: Tier::classify(elo_after),
        }
    }

    /// The movement crossed a tier boundary
    pub fn tier_changed(&self) -> bool {
        self.tier_before != self.tier_after
    }
}

/// Result of applying (or replaying) a match's rating changes
#[derive(Debug, Clone)]
pub struct AppliedRating {
    pub match_id: MatchId,
    pub game_id: GameId,
    pub delta: i32,
    pub winner: RatingTransition,
    pub loser: RatingTransition,
    /// True when this match id had already been applied and nothing moved
    pub already_applied: bool,
}

/// Applies match results to player rankings atomically and idempotently
pub struct RatingEngine {
    rankings: Arc<dyn RankingStore>,
    calculator: EloCalculator,
    max_apply_retries: u32,
}

impl RatingEngine {
    /// Create a new rating engine over the given ranking store
    pub fn new(rankings: Arc<dyn RankingStore>, settings: RatingSettings) -> Result<Self> {
        let max_apply_retries = settings.max_apply_retries;
        let calculator = EloCalculator::new(settings)?;
        Ok(Self {
            rankings,
            calculator,
            max_apply_retries,
        })
    }

    /// Apply one decided match to both participants' rankings.
    ///
    /// Retries the read-compute-commit cycle on version conflicts; a match
    /// id that was already applied returns the recorded transitions with
    /// `already_applied` set and changes nothing.
    pub fn apply_match_result(
        &self,
        match_id: MatchId,
        winner_id: &PlayerId,
        loser_id: &PlayerId,
        game_id: GameId,
    ) -> Result<AppliedRating> {
        for attempt in 1..=self.max_apply_retries {
            let winner_row = self.load_or_init(winner_id, game_id)?;
            let loser_row = self.load_or_init(loser_id, game_id)?;

            let delta = self
                .calculator
                .win_delta(winner_row.elo_rating, loser_row.elo_rating);

            let now = current_timestamp();
            let winner_after = advance_winner(&winner_row, delta, now);
            let loser_after = advance_loser(&loser_row, delta, now);

            let history = vec![
                EloHistoryEntry {
                    match_id,
                    player_id: winner_id.clone(),
                    game_id,
                    elo_before: winner_row.elo_rating,
                    elo_after: winner_after.elo_rating,
                    elo_change: delta,
                    recorded_at: now,
                },
                EloHistoryEntry {
                    match_id,
                    player_id: loser_id.clone(),
                    game_id,
                    elo_before: loser_row.elo_rating,
                    elo_after: loser_after.elo_rating,
                    elo_change: -delta,
                    recorded_at: now,
                },
            ];

            let application = RatingApplication {
                match_id,
                game_id,
                expected_winner_version: winner_row.version,
                expected_loser_version: loser_row.version,
                winner: winner_after.clone(),
                loser: loser_after.clone(),
                history,
            };

            match self.rankings.commit_rating_application(application)? {
                CommitOutcome::Applied => {
                    info!(
                        "Applied rating for match {}: {} {}→{} ({:+}), {} {}→{} ({:+})",
                        match_id,
                        winner_id,
                        winner_row.elo_rating,
                        winner_after.elo_rating,
                        delta,
                        loser_id,
                        loser_row.elo_rating,
                        loser_after.elo_rating,
                        -delta,
                    );
                    return Ok(AppliedRating {
                        match_id,
                        game_id,
                        delta,
                        winner: RatingTransition::from_elo(
                            winner_id.clone(),
                            winner_row.elo_rating,
                            winner_after.elo_rating,
                        ),
                        loser: RatingTransition::from_elo(
                            loser_id.clone(),
                            loser_row.elo_rating,
                            loser_after.elo_rating,
                        ),
                        already_applied: false,
                    });
                }
                CommitOutcome::AlreadyApplied => {
                    debug!("Match {} rating already applied, replay is a no-op", match_id);
                    return self.replay_from_history(match_id, winner_id, game_id);
                }
                CommitOutcome::VersionConflict => {
                    warn!(
                        "Rating commit conflict for match {} (attempt {}/{})",
                        match_id, attempt, self.max_apply_retries
                    );
                }
            }
        }

        Err(TournamentError::RatingApplyFailure {
            match_id: match_id.to_string(),
            reason: format!(
                "version conflict persisted after {} attempts",
                self.max_apply_retries
            ),
        }
        .into())
    }

    fn load_or_init(&self, player_id: &PlayerId, game_id: GameId) -> Result<PlayerRanking> {
        match self.rankings.get_ranking(player_id, &game_id)? {
            Some(row) => Ok(row),
            None => Ok(PlayerRanking::new(
                player_id.clone(),
                game_id,
                self.calculator.base_rating(),
            )),
        }
    }

    /// Rebuild the applied transitions from persisted history
    fn replay_from_history(
        &self,
        match_id: MatchId,
        winner_id: &PlayerId,
        game_id: GameId,
    ) -> Result<AppliedRating> {
        let entries = self.rankings.history_for_match(&match_id)?;
        let winner_entry = entries
            .iter()
            .find(|e| e.player_id == *winner_id)
            .ok_or_else(|| TournamentError::RatingApplyFailure {
                match_id: match_id.to_string(),
                reason: "history entries missing for applied match".to_string(),
            })?;
        let loser_entry = entries
            .iter()
            .find(|e| e.player_id != *winner_id)
            .ok_or_else(|| TournamentError::RatingApplyFailure {
                match_id: match_id.to_string(),
                reason: "history entries missing for applied match".to_string(),
            })?;

        Ok(AppliedRating {
            match_id,
            game_id,
            delta: winner_entry.elo_change,
            winner: RatingTransition::from_elo(
                winner_entry.player_id.clone(),
                winner_entry.elo_before,
                winner_entry.elo_after,
            ),
            loser: RatingTransition::from_elo(
                loser_entry.player_id.clone(),
                loser_entry.elo_before,
                loser_entry.elo_after,
            ),
            already_applied: true,
        })
    }
}

fn advance_winner(
    row: &PlayerRanking,
    delta: i32,
    now: chrono::DateTime<chrono::Utc>,
) -> PlayerRanking {
    let mut after = row.clone();
    after.elo_rating += delta;
    after.peak_elo = after.peak_elo.max(after.elo_rating);
    after.wins += 1;
    after.matches_played += 1;
    after.win_streak += 1;
    after.best_win_streak = after.best_win_streak.max(after.win_streak);
    after.version += 1;
    after.updated_at = now;
    after
}

fn advance_loser(
    row: &PlayerRanking,
    delta: i32,
    now: chrono::DateTime<chrono::Utc>,
) -> PlayerRanking {
    let mut after = row.clone();
    after.elo_rating -= delta;
    after.peak_elo = after.peak_elo.max(after.elo_rating);
    after.losses += 1;
    after.matches_played += 1;
    after.win_streak = 0;
    after.version += 1;
    after.updated_at = now;
    after
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use uuid::Uuid;

    fn engine_over(store: Arc<InMemoryStore>) -> RatingEngine {
        RatingEngine::new(store, RatingSettings::default()).unwrap()
    }

    #[test]
    fn test_lazy_initialization_and_zero_sum() {
        let store = Arc::new(InMemoryStore::new());
        let engine = engine_over(store.clone());
        let game = Uuid::new_v4();

        let applied = engine
            .apply_match_result(Uuid::new_v4(), &"w".to_string(), &"l".to_string(), game)
            .unwrap();

        // Both started at base 1200 with K=32: delta 16
        assert_eq!(applied.delta, 16);
        assert!(!applied.already_applied);

        let winner = store.get_ranking(&"w".to_string(), &game).unwrap().unwrap();
        let loser = store.get_ranking(&"l".to_string(), &game).unwrap().unwrap();
        assert_eq!(winner.elo_rating, 1216);
        assert_eq!(loser.elo_rating, 1184);
        assert_eq!(winner.elo_rating - 1200, -(loser.elo_rating - 1200));
        assert_eq!(winner.peak_elo, 1216);
        assert_eq!(loser.peak_elo, 1200);
    }

    #[test]
    fn test_streak_and_count_bookkeeping() {
        let store = Arc::new(InMemoryStore::new());
        let engine = engine_over(store.clone());
        let game = Uuid::new_v4();
        let (a, b) = ("a".to_string(), "b".to_string());

        engine
            .apply_match_result(Uuid::new_v4(), &a, &b, game)
            .unwrap();
        engine
            .apply_match_result(Uuid::new_v4(), &a, &b, game)
            .unwrap();
        engine
            .apply_match_result(Uuid::new_v4(), &b, &a, game)
            .unwrap();

        let row_a = store.get_ranking(&a, &game).unwrap().unwrap();
        let row_b = store.get_ranking(&b, &game).unwrap().unwrap();

        assert_eq!(row_a.wins, 2);
        assert_eq!(row_a.losses, 1);
        assert_eq!(row_a.matches_played, 3);
        assert_eq!(row_a.win_streak, 0); // reset by the loss
        assert_eq!(row_a.best_win_streak, 2);

        assert_eq!(row_b.wins, 1);
        assert_eq!(row_b.losses, 2);
        assert_eq!(row_b.win_streak, 1);
        assert_eq!(row_b.best_win_streak, 1);

        assert_eq!(row_a.matches_played, row_a.wins + row_a.losses);
        assert_eq!(row_b.matches_played, row_b.wins + row_b.losses);
    }

    #[test]
    fn test_reapply_same_match_is_noop() {
        let store = Arc::new(InMemoryStore::new());
        let engine = engine_over(store.clone());
        let game = Uuid::new_v4();
        let match_id = Uuid::new_v4();
        let (w, l) = ("w".to_string(), "l".to_string());

        let first = engine.apply_match_result(match_id, &w, &l, game).unwrap();
        let replay = engine.apply_match_result(match_id, &w, &l, game).unwrap();

        assert!(!first.already_applied);
        assert!(replay.already_applied);
        assert_eq!(replay.delta, first.delta);
        assert_eq!(replay.winner.elo_after, first.winner.elo_after);

        // Rows did not move a second time
        let row = store.get_ranking(&w, &game).unwrap().unwrap();
        assert_eq!(row.elo_rating, 1216);
        assert_eq!(row.matches_played, 1);
        assert_eq!(store.history_for_match(&match_id).unwrap().len(), 2);
    }

    #[test]
    fn test_history_matches_row_state() {
        let store = Arc::new(InMemoryStore::new());
        let engine = engine_over(store.clone());
        let game = Uuid::new_v4();
        let (w, l) = ("w".to_string(), "l".to_string());

        engine
            .apply_match_result(Uuid::new_v4(), &w, &l, game)
            .unwrap();
        engine
            .apply_match_result(Uuid::new_v4(), &w, &l, game)
            .unwrap();

        let history = store.history_for_player(&w, &game).unwrap();
        assert_eq!(history.len(), 2);
        for entry in &history {
            assert_eq!(entry.elo_after, entry.elo_before + entry.elo_change);
        }
        let row = store.get_ranking(&w, &game).unwrap().unwrap();
        assert_eq!(history.last().unwrap().elo_after, row.elo_rating);
    }

    /// Reads delegate to a real store; every commit reports a conflict
    struct ConflictedRankingStore {
        inner: Arc<InMemoryStore>,
    }

    impl RankingStore for ConflictedRankingStore {
        fn get_ranking(
            &self,
            player_id: &PlayerId,
            game_id: &GameId,
        ) -> Result<Option<PlayerRanking>> {
            self.inner.get_ranking(player_id, game_id)
        }

        fn rankings_for_game(&self, game_id: &GameId) -> Result<Vec<PlayerRanking>> {
            self.inner.rankings_for_game(game_id)
        }

        fn rankings_for_player(&self, player_id: &PlayerId) -> Result<Vec<PlayerRanking>> {
            self.inner.rankings_for_player(player_id)
        }

        fn commit_rating_application(
            &self,
            _application: RatingApplication,
        ) -> Result<CommitOutcome> {
            Ok(CommitOutcome::VersionConflict)
        }

        fn history_for_player(
            &self,
            player_id: &PlayerId,
            game_id: &GameId,
        ) -> Result<Vec<EloHistoryEntry>> {
            self.inner.history_for_player(player_id, game_id)
        }

        fn history_for_match(&self, match_id: &MatchId) -> Result<Vec<EloHistoryEntry>> {
            self.inner.history_for_match(match_id)
        }
    }

    #[test]
    fn test_persistent_conflict_exhausts_retries() {
        let conflicted = Arc::new(ConflictedRankingStore {
            inner: Arc::new(InMemoryStore::new()),
        });
        let engine = RatingEngine::new(conflicted.clone(), RatingSettings::default()).unwrap();

        let err = engine
            .apply_match_result(Uuid::new_v4(), &"w".to_string(), &"l".to_string(), Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TournamentError>().unwrap(),
            TournamentError::RatingApplyFailure { .. }
        ));

        // The bounded loop gave up without writing anything
        assert!(conflicted
            .inner
            .rankings_for_player(&"w".to_string())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_tier_transition_reported() {
        let store = Arc::new(InMemoryStore::new());
        let engine = engine_over(store.clone());
        let game = Uuid::new_v4();
        let (w, l) = ("climber".to_string(), "anchor".to_string());

        // Seed the winner just below the Bronze/Silver boundary
        let mut seeded = PlayerRanking::new(w.clone(), game, 1395);
        seeded.version = 0;
        let seeded_loser = PlayerRanking::new(l.clone(), game, 1395);
        store
            .commit_rating_application(RatingApplication {
                match_id: Uuid::new_v4(),
                game_id: game,
                expected_winner_version: 0,
                expected_loser_version: 0,
                winner: seeded,
                loser: seeded_loser,
                history: vec![],
            })
            .unwrap();

        let applied = engine
            .apply_match_result(Uuid::new_v4(), &w, &l, game)
            .unwrap();

        assert_eq!(applied.winner.tier_before, Tier::Bronze);
        assert_eq!(applied.winner.tier_after, Tier::Silver);
        assert!(applied.winner.tier_changed());
        assert!(!applied.loser.tier_changed());
    }
}
