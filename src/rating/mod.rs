//! Rating system: Elo math, tier classification, and the transactional
//! rating engine

pub mod elo;
pub mod engine;
pub mod tiers;

pub use elo::EloCalculator;
pub use engine::{AppliedRating, RatingEngine, RatingTransition};
pub use tiers::Tier;
