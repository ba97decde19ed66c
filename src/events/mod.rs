//! Outbound event payloads
//!
//! The engine does not own a transport; events are handed to an
//! [`EventPublisher`](publisher::EventPublisher) implementation supplied
//! by the embedding service (which typically forwards them to a push or
//! notification pipeline).

pub mod publisher;

pub use publisher::{EventPublisher, NoopEventPublisher, RecordingEventPublisher};

use crate::rating::Tier;
use crate::types::{GameId, MatchId, PlayerId, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event emitted when a match result is recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCompleted {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub round: u32,
    pub match_number: u32,
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub score1: u32,
    pub score2: u32,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted when the final round's match completes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentCompleted {
    pub tournament_id: TournamentId,
    pub game_id: GameId,
    pub champion: PlayerId,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted when a rating change crosses a tier boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankTierChanged {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub previous_tier: Tier,
    pub new_tier: Tier,
    pub elo_rating: i32,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted when a player's rating climb passes a rival's
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RivalOvertaken {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub rival_id: PlayerId,
    pub player_rating: i32,
    pub rival_rating: i32,
    pub timestamp: DateTime<Utc>,
}

/// Union type for all engine events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    MatchCompleted(MatchCompleted),
    TournamentCompleted(TournamentCompleted),
    RankTierChanged(RankTierChanged),
    RivalOvertaken(RivalOvertaken),
}
