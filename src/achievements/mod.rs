//! Achievement evaluation and unlock persistence
//!
//! Evaluation is a pure function of a player's aggregated stats across
//! every game they have played. Every predicate references only
//! non-decreasing quantities, so the unlocked set can only grow. First
//! unlocks are persisted with a timestamp through an idempotent
//! check-and-insert so "unlocked at" provenance survives.

use crate::error::Result;
use crate::storage::{AchievementStore, AchievementUnlock, RankingStore};
use crate::types::{PlayerId, PlayerRanking};
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Every achievement the platform awards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Achievement {
    /// Played a first match
    FirstBlood,
    /// 10 wins
    Warrior,
    /// 50 wins
    Gladiator,
    /// 100 wins
    Legend,
    /// Best win streak of 5
    HotStreak,
    /// Best win streak of 10
    Unstoppable,
    /// Peak rating 1400
    RisingStar,
    /// Peak rating 1600
    GoldStandard,
    /// Peak rating 1800
    PlatinumClub,
    /// Peak rating 2000
    DiamondMind,
    /// Peak rating 2400
    GrandmasterPeak,
    /// 50 matches played
    Veteran,
    /// 200 matches played
    Marathoner,
}

/// Evaluation order is fixed; earlier entries are the easier unlocks
pub const ALL_ACHIEVEMENTS: [Achievement; 13] = [
    Achievement::FirstBlood,
    Achievement::Warrior,
    Achievement::Gladiator,
    Achievement::Legend,
    Achievement::HotStreak,
    Achievement::Unstoppable,
    Achievement::RisingStar,
    Achievement::GoldStandard,
    Achievement::PlatinumClub,
    Achievement::DiamondMind,
    Achievement::GrandmasterPeak,
    Achievement::Veteran,
    Achievement::Marathoner,
];

impl Achievement {
    /// Stable identifier used by the presentation layer
    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstBlood => "first_blood",
            Achievement::Warrior => "warrior",
            Achievement::Gladiator => "gladiator",
            Achievement::Legend => "legend",
            Achievement::HotStreak => "hot_streak",
            Achievement::Unstoppable => "unstoppable",
            Achievement::RisingStar => "rising_star",
            Achievement::GoldStandard => "gold_standard",
            Achievement::PlatinumClub => "platinum_club",
            Achievement::DiamondMind => "diamond_mind",
            Achievement::GrandmasterPeak => "grandmaster_peak",
            Achievement::Veteran => "veteran",
            Achievement::Marathoner => "marathoner",
        }
    }

    /// Whether the predicate holds for these stats. Every threshold reads
    /// a quantity that never decreases.
    pub fn unlocked_by(&self, stats: &AggregateStats) -> bool {
        match self {
            Achievement::FirstBlood => stats.total_matches >= 1,
            Achievement::Warrior => stats.total_wins >= 10,
            Achievement::Gladiator => stats.total_wins >= 50,
            Achievement::Legend => stats.total_wins >= 100,
            Achievement::HotStreak => stats.best_win_streak >= 5,
            Achievement::Unstoppable => stats.best_win_streak >= 10,
            Achievement::RisingStar => stats.peak_elo >= 1400,
            Achievement::GoldStandard => stats.peak_elo >= 1600,
            Achievement::PlatinumClub => stats.peak_elo >= 1800,
            Achievement::DiamondMind => stats.peak_elo >= 2000,
            Achievement::GrandmasterPeak => stats.peak_elo >= 2400,
            Achievement::Veteran => stats.total_matches >= 50,
            Achievement::Marathoner => stats.total_matches >= 200,
        }
    }
}

/// A player's stats aggregated across every game they have played
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_wins: u32,
    pub total_matches: u32,
    pub best_win_streak: u32,
    pub peak_elo: i32,
}

impl AggregateStats {
    /// Fold per-game ranking rows into one cross-game aggregate
    pub fn from_rankings(rankings: &[PlayerRanking]) -> Self {
        rankings.iter().fold(Self::default(), |acc, row| Self {
            total_wins: acc.total_wins + row.wins,
            total_matches: acc.total_matches + row.matches_played,
            best_win_streak: acc.best_win_streak.max(row.best_win_streak),
            peak_elo: acc.peak_elo.max(row.peak_elo),
        })
    }
}

/// Evaluate which achievements currently hold, in canonical order
pub fn evaluate(stats: &AggregateStats) -> Vec<Achievement> {
    ALL_ACHIEVEMENTS
        .iter()
        .copied()
        .filter(|achievement| achievement.unlocked_by(stats))
        .collect()
}

/// Evaluates achievements from stored rankings and persists first unlocks
pub struct AchievementService {
    rankings: Arc<dyn RankingStore>,
    unlocks: Arc<dyn AchievementStore>,
}

impl AchievementService {
    pub fn new(rankings: Arc<dyn RankingStore>, unlocks: Arc<dyn AchievementStore>) -> Self {
        Self { rankings, unlocks }
    }

    /// Current unlocked set from stored rankings (pure recompute)
    pub fn unlocked_for(&self, player_id: &PlayerId) -> Result<Vec<Achievement>> {
        let rankings = self.rankings.rankings_for_player(player_id)?;
        Ok(evaluate(&AggregateStats::from_rankings(&rankings)))
    }

    /// Persist any newly-true predicates with an unlock timestamp.
    /// Idempotent: re-running never moves an existing timestamp. Returns
    /// only the achievements this call unlocked.
    pub fn sync_unlocks(&self, player_id: &PlayerId) -> Result<Vec<Achievement>> {
        let unlocked = self.unlocked_for(player_id)?;
        let now = current_timestamp();

        let mut fresh = Vec::new();
        for achievement in unlocked {
            if self.unlocks.try_unlock(player_id, achievement, now)? {
                info!("Player {} unlocked achievement {}", player_id, achievement.id());
                fresh.push(achievement);
            }
        }
        Ok(fresh)
    }

    /// All persisted unlocks with their timestamps
    pub fn unlock_records(&self, player_id: &PlayerId) -> Result<Vec<AchievementUnlock>> {
        self.unlocks.unlocks_for(player_id)
    }
}
