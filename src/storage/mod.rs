//! Storage interfaces for the tournament engine
//!
//! The engine owns no persistence of its own; it reads and writes through
//! these traits. `InMemoryStore` provides a reference implementation used
//! by tests and embedders; production deployments back these with a
//! relational store.

pub mod memory;

pub use memory::InMemoryStore;

use crate::achievements::Achievement;
use crate::error::Result;
use crate::types::{
    BracketMatch, EloHistoryEntry, GameId, MatchId, MatchStatus, PlayerId, PlayerRanking,
    Registration, Slot, Tournament, TournamentId,
};
use chrono::{DateTime, Utc};

/// Outcome of a conditional next-round slot write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotFill {
    /// The slot was empty and is now filled
    Filled,
    /// The slot was already occupied by this player
    AlreadyFilled(PlayerId),
}

/// Fields written when a match is completed. Walkover completions (bye
/// resolution) carry no scores.
#[derive(Debug, Clone)]
pub struct MatchCompletion {
    pub winner: PlayerId,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of an atomic rating commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Both rows and the history entries were written
    Applied,
    /// This match id already has history entries; nothing was written
    AlreadyApplied,
    /// A ranking row changed under us; nothing was written
    VersionConflict,
}

/// A fully-computed rating update for one match, committed as a unit.
///
/// The `winner`/`loser` rows carry their post-update `version`; the
/// `expected_*_version` fields are the versions the rows had when they
/// were read. The store rejects the commit if either row has moved.
#[derive(Debug, Clone)]
pub struct RatingApplication {
    pub match_id: MatchId,
    pub game_id: GameId,
    pub winner: PlayerRanking,
    pub loser: PlayerRanking,
    pub expected_winner_version: u64,
    pub expected_loser_version: u64,
    pub history: Vec<EloHistoryEntry>,
}

/// Tournament rows and registrations
pub trait TournamentStore: Send + Sync {
    /// Get a tournament by id
    fn get_tournament(&self, id: &TournamentId) -> Result<Option<Tournament>>;

    /// Create or replace a tournament row
    fn upsert_tournament(&self, tournament: Tournament) -> Result<()>;

    /// Record a registration
    fn add_registration(&self, registration: Registration) -> Result<()>;

    /// Entrants with a Confirmed registration, in registration order
    fn confirmed_entrants(&self, id: &TournamentId) -> Result<Vec<PlayerId>>;
}

/// Bracket match rows
pub trait MatchStore: Send + Sync {
    /// Bulk-create matches (bracket generation)
    fn create_matches(&self, matches: Vec<BracketMatch>) -> Result<()>;

    /// Delete every match of a tournament; returns how many were removed
    fn delete_matches_for(&self, tournament_id: &TournamentId) -> Result<usize>;

    /// Get a match by id
    fn get_match(&self, id: &MatchId) -> Result<Option<BracketMatch>>;

    /// All matches of a tournament, ordered by (round, match_number)
    fn matches_for_tournament(&self, tournament_id: &TournamentId) -> Result<Vec<BracketMatch>>;

    /// Locate a match by bracket position
    fn find_match(
        &self,
        tournament_id: &TournamentId,
        round: u32,
        match_number: u32,
    ) -> Result<Option<BracketMatch>>;

    /// Mark a match completed with winner and scores. Conditional: returns
    /// false (writing nothing) if the match is already Completed.
    fn complete_match(&self, id: &MatchId, completion: MatchCompletion) -> Result<bool>;

    /// Put a match row back to a previously-read state (rating rollback)
    fn restore_match(&self, match_row: BracketMatch) -> Result<()>;

    /// Administrative status change (InProgress / Disputed)
    fn set_match_status(&self, id: &MatchId, status: MatchStatus) -> Result<bool>;

    /// Fill one participant slot of the match at the given bracket
    /// position, as a single conditional update. Returns `None` if no such
    /// match exists (e.g. the final has no successor).
    fn fill_slot(
        &self,
        tournament_id: &TournamentId,
        round: u32,
        match_number: u32,
        slot: Slot,
        player: &PlayerId,
    ) -> Result<Option<SlotFill>>;
}

/// Player ranking rows and Elo history
pub trait RankingStore: Send + Sync {
    /// Get the ranking row for (player, game)
    fn get_ranking(&self, player_id: &PlayerId, game_id: &GameId) -> Result<Option<PlayerRanking>>;

    /// All ranking rows for a game
    fn rankings_for_game(&self, game_id: &GameId) -> Result<Vec<PlayerRanking>>;

    /// All ranking rows for a player across games (achievement input)
    fn rankings_for_player(&self, player_id: &PlayerId) -> Result<Vec<PlayerRanking>>;

    /// Atomically apply one match's rating changes: both rows plus their
    /// history entries, or nothing. Idempotent keyed by match id.
    fn commit_rating_application(&self, application: RatingApplication) -> Result<CommitOutcome>;

    /// Elo history for a player in a game, oldest first
    fn history_for_player(
        &self,
        player_id: &PlayerId,
        game_id: &GameId,
    ) -> Result<Vec<EloHistoryEntry>>;

    /// Elo history rows written for a match (0 or 2 entries)
    fn history_for_match(&self, match_id: &MatchId) -> Result<Vec<EloHistoryEntry>>;
}

/// A persisted first-unlock record
#[derive(Debug, Clone)]
pub struct AchievementUnlock {
    pub player_id: PlayerId,
    pub achievement: Achievement,
    pub unlocked_at: DateTime<Utc>,
}

/// First-unlock timestamps for achievements
pub trait AchievementStore: Send + Sync {
    /// Check-and-insert: returns true if this call created the unlock,
    /// false if it already existed. Never overwrites an earlier timestamp.
    fn try_unlock(
        &self,
        player_id: &PlayerId,
        achievement: Achievement,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// All persisted unlocks for a player
    fn unlocks_for(&self, player_id: &PlayerId) -> Result<Vec<AchievementUnlock>>;
}
