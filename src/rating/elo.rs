//! Elo rating math
//!
//! This module provides the concrete rating formula used by the engine:
//! classic Elo expectation (via the skillratings crate) with integer,
//! zero-sum deltas.

use crate::config::RatingSettings;
use crate::error::{Result, TournamentError};
use skillratings::elo::{expected_score, EloRating};

/// Elo calculator with a fixed K-factor and base rating
#[derive(Debug, Clone)]
pub struct EloCalculator {
    settings: RatingSettings,
}

impl EloCalculator {
    /// Create a new calculator, validating its parameters
    pub fn new(settings: RatingSettings) -> Result<Self> {
        if settings.k_factor == 0 {
            return Err(TournamentError::ConfigurationError {
                message: "K-factor must be positive".to_string(),
            }
            .into());
        }
        if settings.base_rating < 0 {
            return Err(TournamentError::ConfigurationError {
                message: "Base rating cannot be negative".to_string(),
            }
            .into());
        }

        Ok(Self { settings })
    }

    /// Rating assigned to players on their first match
    pub fn base_rating(&self) -> i32 {
        self.settings.base_rating
    }

    /// Probability that a player at `rating_a` beats one at `rating_b`:
    /// `1 / (1 + 10^((rating_b - rating_a) / 400))`
    pub fn expected(&self, rating_a: i32, rating_b: i32) -> f64 {
        let a = EloRating {
            rating: rating_a as f64,
        };
        let b = EloRating {
            rating: rating_b as f64,
        };
        let (expected_a, _expected_b) = expected_score(&a, &b);
        expected_a
    }

    /// Points exchanged when `winner_elo` beats `loser_elo`:
    /// `round(K * (1 - expected(winner, loser)))`.
    ///
    /// The winner gains exactly this amount and the loser drops exactly
    /// this amount, so the exchange is zero-sum.
    pub fn win_delta(&self, winner_elo: i32, loser_elo: i32) -> i32 {
        let expected_winner = self.expected(winner_elo, loser_elo);
        (self.settings.k_factor as f64 * (1.0 - expected_winner)).round() as i32
    }
}

impl Default for EloCalculator {
    fn default() -> Self {
        Self {
            settings: RatingSettings::default(),
        }
    }
}
