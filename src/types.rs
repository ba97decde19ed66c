//! Common types used throughout the tournament engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players and teams
pub type PlayerId = String;

/// Unique identifier for tournaments
pub type TournamentId = Uuid;

/// Unique identifier for games (the title being competed in)
pub type GameId = Uuid;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Lifecycle state of a tournament, owned by the organizer-facing layer.
/// The engine consumes it read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TournamentStatus {
    Draft,
    Registration,
    Live,
    Completed,
    Cancelled,
}

/// Bracket formats supported by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BracketType {
    SingleElimination,
}

/// Registration approval state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// Per-match lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    Pending,
    InProgress,
    Completed,
    Disputed,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "Pending"),
            MatchStatus::InProgress => write!(f, "InProgress"),
            MatchStatus::Completed => write!(f, "Completed"),
            MatchStatus::Disputed => write!(f, "Disputed"),
        }
    }
}

/// A tournament as seen by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub game_id: GameId,
    pub name: String,
    pub bracket_type: BracketType,
    pub status: TournamentStatus,
    pub max_entrants: u32,
    pub created_at: DateTime<Utc>,
}

/// An entrant's registration for a tournament. Only `Confirmed`
/// registrations are eligible bracket input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub tournament_id: TournamentId,
    pub entrant: PlayerId,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}

/// One node of an elimination bracket.
///
/// Participant slots are `None` until a previous-round winner propagates
/// in (or forever, for a round-1 bye slot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1-indexed round number
    pub round: u32,
    /// 1-indexed position within the round
    pub match_number: u32,
    pub participant1: Option<PlayerId>,
    pub participant2: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub status: MatchStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BracketMatch {
    /// Create an unplayed match with the given participant slots
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        match_number: u32,
        participant1: Option<PlayerId>,
        participant2: Option<PlayerId>,
    ) -> Self {
        Self {
            id: crate::utils::generate_match_id(),
            tournament_id,
            round,
            match_number,
            participant1,
            participant2,
            winner: None,
            score1: None,
            score2: None,
            status: MatchStatus::Pending,
            completed_at: None,
        }
    }

    /// Both participant slots are filled and the match can take a result
    pub fn is_ready(&self) -> bool {
        self.participant1.is_some()
            && self.participant2.is_some()
            && self.status != MatchStatus::Completed
    }

    /// Exactly one participant is present (a round-1 bye slot)
    pub fn is_bye(&self) -> bool {
        self.participant1.is_some() != self.participant2.is_some()
    }
}

/// Which slot of a match a propagated winner lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Participant1,
    Participant2,
}

/// Cumulative per-(player, game) rating state.
///
/// Mutated only through `RankingStore::commit_rating_application`; the
/// `version` field is the optimistic-concurrency token guarding the
/// read-modify-write cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRanking {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub elo_rating: i32,
    pub peak_elo: i32,
    pub wins: u32,
    pub losses: u32,
    pub matches_played: u32,
    /// Current consecutive wins, reset to 0 on any loss
    pub win_streak: u32,
    pub best_win_streak: u32,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerRanking {
    /// Create a fresh ranking row at the given base rating
    pub fn new(player_id: PlayerId, game_id: GameId, base_rating: i32) -> Self {
        let now = crate::utils::current_timestamp();
        Self {
            player_id,
            game_id,
            elo_rating: base_rating,
            peak_elo: base_rating,
            wins: 0,
            losses: 0,
            matches_played: 0,
            win_streak: 0,
            best_win_streak: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Append-only audit row recording one player's rating movement for one
/// match. `elo_after == elo_before + elo_change` always.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EloHistoryEntry {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub elo_before: i32,
    pub elo_after: i32,
    pub elo_change: i32,
    pub recorded_at: DateTime<Utc>,
}
