//! Main engine configuration
//!
//! This module defines the primary configuration structure for the
//! tournament engine, including environment variable loading and
//! validation.

use crate::config::bracket::BracketSettings;
use crate::config::rating::RatingSettings;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub rating: RatingSettings,
    pub bracket: BracketSettings,
    pub standings: StandingsSettings,
}

/// Standings and overtake-detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsSettings {
    /// How many recent Elo history entries to inspect for overtakes
    pub overtake_history_window: usize,
}

impl Default for StandingsSettings {
    fn default() -> Self {
        Self {
            overtake_history_window: 5,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with fallback to
    /// defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(base) = env::var("ELO_BASE_RATING") {
            config.rating.base_rating = base
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_BASE_RATING value: {}", base))?;
        }
        if let Ok(k) = env::var("ELO_K_FACTOR") {
            config.rating.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_K_FACTOR value: {}", k))?;
        }
        if let Ok(retries) = env::var("RATING_MAX_APPLY_RETRIES") {
            config.rating.max_apply_retries = retries
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_MAX_APPLY_RETRIES value: {}", retries))?;
        }
        if let Ok(policy) = env::var("BRACKET_SEEDING_POLICY") {
            config.bracket.seeding = policy;
        }
        if let Ok(seed) = env::var("BRACKET_RANDOM_SEED") {
            config.bracket.random_seed = Some(
                seed.parse()
                    .map_err(|_| anyhow!("Invalid BRACKET_RANDOM_SEED value: {}", seed))?,
            );
        }
        if let Ok(window) = env::var("OVERTAKE_HISTORY_WINDOW") {
            config.standings.overtake_history_window = window
                .parse()
                .map_err(|_| anyhow!("Invalid OVERTAKE_HISTORY_WINDOW value: {}", window))?;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate configuration values
pub fn validate_config(config: &EngineConfig) -> Result<()> {
    if config.rating.base_rating < 0 {
        return Err(anyhow!("Base rating cannot be negative"));
    }
    if config.rating.k_factor == 0 {
        return Err(anyhow!("K-factor must be greater than 0"));
    }
    if config.rating.max_apply_retries == 0 {
        return Err(anyhow!("Max apply retries must be greater than 0"));
    }
    if config.bracket.seeding_policy().is_none() {
        return Err(anyhow!(
            "Unknown seeding policy: {}",
            config.bracket.seeding
        ));
    }
    if config.standings.overtake_history_window == 0 {
        return Err(anyhow!("Overtake history window must be greater than 0"));
    }

    Ok(())
}
