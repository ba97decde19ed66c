//! Rating tier classification
//!
//! The single canonical elo-to-tier table. Every consumer (events,
//! standings, profile surfaces) goes through [`Tier::classify`]; there is
//! deliberately no second copy of these thresholds anywhere.

use serde::{Deserialize, Serialize};

/// Named band of the rating scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
}

/// Ascending, non-overlapping lower bounds for each tier
const TIER_FLOORS: [(Tier, i32); 8] = [
    (Tier::Iron, 0),
    (Tier::Bronze, 1200),
    (Tier::Silver, 1400),
    (Tier::Gold, 1600),
    (Tier::Platinum, 1800),
    (Tier::Diamond, 2000),
    (Tier::Master, 2200),
    (Tier::Grandmaster, 2400),
];

impl Tier {
    /// Map a rating to its tier. Total over all integers; ratings below
    /// the Iron floor still classify as Iron.
    pub fn classify(elo: i32) -> Tier {
        let mut tier = Tier::Iron;
        for (candidate, floor) in TIER_FLOORS {
            if elo >= floor {
                tier = candidate;
            } else {
                break;
            }
        }
        tier
    }

    /// Lowest rating that classifies as this tier
    pub fn floor(&self) -> i32 {
        TIER_FLOORS
            .iter()
            .find(|(tier, _)| tier == self)
            .map(|(_, floor)| *floor)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Iron => write!(f, "Iron"),
            Tier::Bronze => write!(f, "Bronze"),
            Tier::Silver => write!(f, "Silver"),
            Tier::Gold => write!(f, "Gold"),
            Tier::Platinum => write!(f, "Platinum"),
            Tier::Diamond => write!(f, "Diamond"),
            Tier::Master => write!(f, "Master"),
            Tier::Grandmaster => write!(f, "Grandmaster"),
        }
    }
}
