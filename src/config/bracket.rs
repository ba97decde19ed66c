//! Bracket generation configuration

use crate::bracket::SeedingPolicy;
use serde::{Deserialize, Serialize};

/// Settings controlling how brackets are seeded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketSettings {
    /// Seeding policy name: "random" or "by_rating"
    pub seeding: String,
    /// Fixed shuffle seed for reproducible random seeding
    pub random_seed: Option<u64>,
}

impl Default for BracketSettings {
    fn default() -> Self {
        Self {
            seeding: "random".to_string(),
            random_seed: None,
        }
    }
}

impl BracketSettings {
    /// Resolve the configured policy, or `None` if the name is unknown
    pub fn seeding_policy(&self) -> Option<SeedingPolicy> {
        match self.seeding.to_lowercase().as_str() {
            "random" => Some(SeedingPolicy::Random {
                seed: self.random_seed,
            }),
            "by_rating" => Some(SeedingPolicy::ByRating),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_resolution() {
        let mut settings = BracketSettings::default();
        assert!(matches!(
            settings.seeding_policy(),
            Some(SeedingPolicy::Random { seed: None })
        ));

        settings.random_seed = Some(42);
        assert!(matches!(
            settings.seeding_policy(),
            Some(SeedingPolicy::Random { seed: Some(42) })
        ));

        settings.seeding = "by_rating".to_string();
        assert!(matches!(
            settings.seeding_policy(),
            Some(SeedingPolicy::ByRating)
        ));

        settings.seeding = "swiss".to_string();
        assert!(settings.seeding_policy().is_none());
    }
}
