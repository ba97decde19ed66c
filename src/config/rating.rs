//! Rating system configuration

use serde::{Deserialize, Serialize};

/// Elo rating parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSettings {
    /// Rating assigned to players on their first match in a game
    pub base_rating: i32,
    /// K-factor: how much a single match moves a rating
    pub k_factor: u32,
    /// How many times a version-conflicted rating commit is retried
    pub max_apply_retries: u32,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            base_rating: 1200,
            k_factor: 32,
            max_apply_retries: 3,
        }
    }
}
