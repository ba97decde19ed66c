//! Bracket Engine - Tournament bracket and rating engine
//!
//! This crate provides single-elimination bracket generation, match
//! progression with winner propagation, Elo-based ratings with tier
//! classification, achievement evaluation, and leaderboard standings.

pub mod achievements;
pub mod bracket;
pub mod config;
pub mod error;
pub mod events;
pub mod rating;
pub mod standings;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, TournamentError};
pub use types::*;

// Re-export key components
pub use achievements::{Achievement, AchievementService};
pub use bracket::{BracketGenerator, MatchProgressionEngine, SeedingPolicy};
pub use events::publisher::EventPublisher;
pub use rating::{RatingEngine, Tier};
pub use standings::StandingsService;
pub use storage::InMemoryStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
