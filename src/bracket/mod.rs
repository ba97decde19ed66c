//! Bracket construction and round-by-round progression

pub mod generator;
pub mod progression;

pub use generator::{BracketGenerator, SeedingPolicy};
pub use progression::MatchProgressionEngine;
