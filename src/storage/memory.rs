//! In-memory storage implementation
//!
//! Backs every store trait with RwLock-guarded maps. The rating commit and
//! the slot fill are performed entirely under a write lock, which is what
//! gives them their conditional/atomic semantics in this implementation.

use crate::achievements::Achievement;
use crate::error::{Result, TournamentError};
use crate::storage::{
    AchievementStore, AchievementUnlock, CommitOutcome, MatchCompletion, MatchStore,
    RankingStore, RatingApplication, SlotFill, TournamentStore,
};
use crate::types::{
    BracketMatch, EloHistoryEntry, GameId, MatchId, MatchStatus, PlayerId, PlayerRanking,
    Registration, RegistrationStatus, Slot, Tournament, TournamentId,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory store implementing every engine storage trait
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tournaments: RwLock<HashMap<TournamentId, Tournament>>,
    registrations: RwLock<Vec<Registration>>,
    matches: RwLock<HashMap<MatchId, BracketMatch>>,
    rankings: RwLock<HashMap<(PlayerId, GameId), PlayerRanking>>,
    history: RwLock<Vec<EloHistoryEntry>>,
    unlocks: RwLock<HashMap<(PlayerId, Achievement), DateTime<Utc>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn read_lock<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| {
        TournamentError::StorageError {
            message: format!("Failed to acquire {} read lock", what),
        }
        .into()
    })
}

fn write_lock<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| {
        TournamentError::StorageError {
            message: format!("Failed to acquire {} write lock", what),
        }
        .into()
    })
}

impl TournamentStore for InMemoryStore {
    fn get_tournament(&self, id: &TournamentId) -> Result<Option<Tournament>> {
        let tournaments = read_lock(&self.tournaments, "tournaments")?;
        Ok(tournaments.get(id).cloned())
    }

    fn upsert_tournament(&self, tournament: Tournament) -> Result<()> {
        let mut tournaments = write_lock(&self.tournaments, "tournaments")?;
        tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    fn add_registration(&self, registration: Registration) -> Result<()> {
        let mut registrations = write_lock(&self.registrations, "registrations")?;
        registrations.push(registration);
        Ok(())
    }

    fn confirmed_entrants(&self, id: &TournamentId) -> Result<Vec<PlayerId>> {
        let registrations = read_lock(&self.registrations, "registrations")?;
        Ok(registrations
            .iter()
            .filter(|r| r.tournament_id == *id && r.status == RegistrationStatus::Confirmed)
            .map(|r| r.entrant.clone())
            .collect())
    }
}

impl MatchStore for InMemoryStore {
    fn create_matches(&self, new_matches: Vec<BracketMatch>) -> Result<()> {
        let mut matches = write_lock(&self.matches, "matches")?;
        for m in new_matches {
            matches.insert(m.id, m);
        }
        Ok(())
    }

    fn delete_matches_for(&self, tournament_id: &TournamentId) -> Result<usize> {
        let mut matches = write_lock(&self.matches, "matches")?;
        let before = matches.len();
        matches.retain(|_, m| m.tournament_id != *tournament_id);
        Ok(before - matches.len())
    }

    fn get_match(&self, id: &MatchId) -> Result<Option<BracketMatch>> {
        let matches = read_lock(&self.matches, "matches")?;
        Ok(matches.get(id).cloned())
    }

    fn matches_for_tournament(&self, tournament_id: &TournamentId) -> Result<Vec<BracketMatch>> {
        let matches = read_lock(&self.matches, "matches")?;
        let mut result: Vec<BracketMatch> = matches
            .values()
            .filter(|m| m.tournament_id == *tournament_id)
            .cloned()
            .collect();
        result.sort_by_key(|m| (m.round, m.match_number));
        Ok(result)
    }

    fn find_match(
        &self,
        tournament_id: &TournamentId,
        round: u32,
        match_number: u32,
    ) -> Result<Option<BracketMatch>> {
        let matches = read_lock(&self.matches, "matches")?;
        Ok(matches
            .values()
            .find(|m| {
                m.tournament_id == *tournament_id
                    && m.round == round
                    && m.match_number == match_number
            })
            .cloned())
    }

    fn complete_match(&self, id: &MatchId, completion: MatchCompletion) -> Result<bool> {
        let mut matches = write_lock(&self.matches, "matches")?;
        let match_row = matches.get_mut(id).ok_or(TournamentError::MatchNotFound {
            match_id: id.to_string(),
        })?;

        if match_row.status == MatchStatus::Completed {
            return Ok(false);
        }

        match_row.status = MatchStatus::Completed;
        match_row.winner = Some(completion.winner);
        match_row.score1 = completion.score1;
        match_row.score2 = completion.score2;
        match_row.completed_at = Some(completion.completed_at);
        Ok(true)
    }

    fn restore_match(&self, match_row: BracketMatch) -> Result<()> {
        let mut matches = write_lock(&self.matches, "matches")?;
        matches.insert(match_row.id, match_row);
        Ok(())
    }

    fn set_match_status(&self, id: &MatchId, status: MatchStatus) -> Result<bool> {
        let mut matches = write_lock(&self.matches, "matches")?;
        match matches.get_mut(id) {
            Some(match_row) => {
                match_row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn fill_slot(
        &self,
        tournament_id: &TournamentId,
        round: u32,
        match_number: u32,
        slot: Slot,
        player: &PlayerId,
    ) -> Result<Option<SlotFill>> {
        let mut matches = write_lock(&self.matches, "matches")?;
        let target = matches.values_mut().find(|m| {
            m.tournament_id == *tournament_id && m.round == round && m.match_number == match_number
        });

        let Some(target) = target else {
            return Ok(None);
        };

        let slot_ref = match slot {
            Slot::Participant1 => &mut target.participant1,
            Slot::Participant2 => &mut target.participant2,
        };

        match slot_ref {
            Some(existing) => Ok(Some(SlotFill::AlreadyFilled(existing.clone()))),
            None => {
                *slot_ref = Some(player.clone());
                Ok(Some(SlotFill::Filled))
            }
        }
    }
}

impl RankingStore for InMemoryStore {
    fn get_ranking(&self, player_id: &PlayerId, game_id: &GameId) -> Result<Option<PlayerRanking>> {
        let rankings = read_lock(&self.rankings, "rankings")?;
        Ok(rankings.get(&(player_id.clone(), *game_id)).cloned())
    }

    fn rankings_for_game(&self, game_id: &GameId) -> Result<Vec<PlayerRanking>> {
        let rankings = read_lock(&self.rankings, "rankings")?;
        Ok(rankings
            .values()
            .filter(|r| r.game_id == *game_id)
            .cloned()
            .collect())
    }

    fn rankings_for_player(&self, player_id: &PlayerId) -> Result<Vec<PlayerRanking>> {
        let rankings = read_lock(&self.rankings, "rankings")?;
        Ok(rankings
            .values()
            .filter(|r| r.player_id == *player_id)
            .cloned()
            .collect())
    }

    fn commit_rating_application(&self, application: RatingApplication) -> Result<CommitOutcome> {
        // Lock order: history before rankings, always.
        let mut history = write_lock(&self.history, "history")?;
        let mut rankings = write_lock(&self.rankings, "rankings")?;

        if history.iter().any(|h| h.match_id == application.match_id) {
            return Ok(CommitOutcome::AlreadyApplied);
        }

        let winner_key = (
            application.winner.player_id.clone(),
            application.winner.game_id,
        );
        let loser_key = (
            application.loser.player_id.clone(),
            application.loser.game_id,
        );

        // Absent row reads as version 0 (lazy initialization).
        let winner_current = rankings.get(&winner_key).map(|r| r.version).unwrap_or(0);
        let loser_current = rankings.get(&loser_key).map(|r| r.version).unwrap_or(0);

        if winner_current != application.expected_winner_version
            || loser_current != application.expected_loser_version
        {
            return Ok(CommitOutcome::VersionConflict);
        }

        rankings.insert(winner_key, application.winner);
        rankings.insert(loser_key, application.loser);
        history.extend(application.history);

        Ok(CommitOutcome::Applied)
    }

    fn history_for_player(
        &self,
        player_id: &PlayerId,
        game_id: &GameId,
    ) -> Result<Vec<EloHistoryEntry>> {
        let history = read_lock(&self.history, "history")?;
        Ok(history
            .iter()
            .filter(|h| h.player_id == *player_id && h.game_id == *game_id)
            .cloned()
            .collect())
    }

    fn history_for_match(&self, match_id: &MatchId) -> Result<Vec<EloHistoryEntry>> {
        let history = read_lock(&self.history, "history")?;
        Ok(history
            .iter()
            .filter(|h| h.match_id == *match_id)
            .cloned()
            .collect())
    }
}

impl AchievementStore for InMemoryStore {
    fn try_unlock(
        &self,
        player_id: &PlayerId,
        achievement: Achievement,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut unlocks = write_lock(&self.unlocks, "unlocks")?;
        let key = (player_id.clone(), achievement);
        if unlocks.contains_key(&key) {
            return Ok(false);
        }
        unlocks.insert(key, at);
        Ok(true)
    }

    fn unlocks_for(&self, player_id: &PlayerId) -> Result<Vec<AchievementUnlock>> {
        let unlocks = read_lock(&self.unlocks, "unlocks")?;
        let mut result: Vec<AchievementUnlock> = unlocks
            .iter()
            .filter(|((pid, _), _)| pid == player_id)
            .map(|((pid, achievement), at)| AchievementUnlock {
                player_id: pid.clone(),
                achievement: *achievement,
                unlocked_at: *at,
            })
            .collect();
        result.sort_by_key(|u| u.unlocked_at);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::current_timestamp;
    use uuid::Uuid;

    fn ranking(player: &str, game: GameId, elo: i32, version: u64) -> PlayerRanking {
        let mut r = PlayerRanking::new(player.to_string(), game, elo);
        r.version = version;
        r
    }

    fn history_entry(match_id: MatchId, player: &str, game: GameId, delta: i32) -> EloHistoryEntry {
        EloHistoryEntry {
            match_id,
            player_id: player.to_string(),
            game_id: game,
            elo_before: 1200,
            elo_after: 1200 + delta,
            elo_change: delta,
            recorded_at: current_timestamp(),
        }
    }

    #[test]
    fn test_complete_match_is_conditional() {
        let store = InMemoryStore::new();
        let tid = Uuid::new_v4();
        let m = BracketMatch::new(tid, 1, 1, Some("a".into()), Some("b".into()));
        let mid = m.id;
        store.create_matches(vec![m]).unwrap();

        let completion = MatchCompletion {
            winner: "a".to_string(),
            score1: Some(2),
            score2: Some(1),
            completed_at: current_timestamp(),
        };

        assert!(store.complete_match(&mid, completion.clone()).unwrap());
        // Second completion loses the conditional update
        assert!(!store.complete_match(&mid, completion).unwrap());
    }

    #[test]
    fn test_fill_slot_single_writer_wins() {
        let store = InMemoryStore::new();
        let tid = Uuid::new_v4();
        store
            .create_matches(vec![BracketMatch::new(tid, 2, 1, None, None)])
            .unwrap();

        let first = store
            .fill_slot(&tid, 2, 1, Slot::Participant1, &"alice".to_string())
            .unwrap();
        assert_eq!(first, Some(SlotFill::Filled));

        let second = store
            .fill_slot(&tid, 2, 1, Slot::Participant1, &"bob".to_string())
            .unwrap();
        assert_eq!(second, Some(SlotFill::AlreadyFilled("alice".to_string())));

        // Other slot is independent
        let other = store
            .fill_slot(&tid, 2, 1, Slot::Participant2, &"bob".to_string())
            .unwrap();
        assert_eq!(other, Some(SlotFill::Filled));
    }

    #[test]
    fn test_fill_slot_missing_match_is_none() {
        let store = InMemoryStore::new();
        let result = store
            .fill_slot(&Uuid::new_v4(), 9, 9, Slot::Participant1, &"x".to_string())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_commit_is_idempotent_by_match_id() {
        let store = InMemoryStore::new();
        let game = Uuid::new_v4();
        let match_id = Uuid::new_v4();

        let application = RatingApplication {
            match_id,
            game_id: game,
            winner: ranking("w", game, 1216, 1),
            loser: ranking("l", game, 1184, 1),
            expected_winner_version: 0,
            expected_loser_version: 0,
            history: vec![
                history_entry(match_id, "w", game, 16),
                history_entry(match_id, "l", game, -16),
            ],
        };

        assert_eq!(
            store.commit_rating_application(application.clone()).unwrap(),
            CommitOutcome::Applied
        );
        assert_eq!(
            store.commit_rating_application(application).unwrap(),
            CommitOutcome::AlreadyApplied
        );
        assert_eq!(store.history_for_match(&match_id).unwrap().len(), 2);
    }

    #[test]
    fn test_commit_rejects_stale_versions() {
        let store = InMemoryStore::new();
        let game = Uuid::new_v4();

        // Seed a row at version 3 via a first commit chain
        let first = RatingApplication {
            match_id: Uuid::new_v4(),
            game_id: game,
            winner: ranking("w", game, 1216, 3),
            loser: ranking("l", game, 1184, 1),
            expected_winner_version: 0,
            expected_loser_version: 0,
            history: vec![],
        };
        assert_eq!(
            store.commit_rating_application(first).unwrap(),
            CommitOutcome::Applied
        );

        // A commit computed from a stale read must be rejected
        let stale = RatingApplication {
            match_id: Uuid::new_v4(),
            game_id: game,
            winner: ranking("w", game, 1230, 4),
            loser: ranking("l", game, 1170, 2),
            expected_winner_version: 0, // actually 3 now
            expected_loser_version: 1,
            history: vec![],
        };
        assert_eq!(
            store.commit_rating_application(stale).unwrap(),
            CommitOutcome::VersionConflict
        );
    }

    #[test]
    fn test_confirmed_entrants_filters_status() {
        let store = InMemoryStore::new();
        let tid = Uuid::new_v4();
        let now = current_timestamp();
        for (name, status) in [
            ("a", RegistrationStatus::Confirmed),
            ("b", RegistrationStatus::Pending),
            ("c", RegistrationStatus::Confirmed),
            ("d", RegistrationStatus::Rejected),
        ] {
            store
                .add_registration(Registration {
                    tournament_id: tid,
                    entrant: name.to_string(),
                    status,
                    registered_at: now,
                })
                .unwrap();
        }

        let entrants = store.confirmed_entrants(&tid).unwrap();
        assert_eq!(entrants, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_try_unlock_inserts_once() {
        let store = InMemoryStore::new();
        let player = "p1".to_string();
        let first_ts = current_timestamp();

        assert!(store
            .try_unlock(&player, Achievement::FirstBlood, first_ts)
            .unwrap());
        assert!(!store
            .try_unlock(&player, Achievement::FirstBlood, current_timestamp())
            .unwrap());

        let unlocks = store.unlocks_for(&player).unwrap();
        assert_eq!(unlocks.len(), 1);
        assert_eq!(unlocks[0].unlocked_at, first_ts);
    }
}
