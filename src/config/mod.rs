//! Configuration management for the tournament engine
//!
//! This module handles all configuration loading from environment
//! variables, validation, and default values for the engine.

pub mod bracket;
pub mod engine;
pub mod rating;

// Re-export commonly used types
pub use bracket::BracketSettings;
pub use engine::{validate_config, EngineConfig, StandingsSettings};
pub use rating::RatingSettings;
