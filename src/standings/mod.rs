//! Leaderboard positions, percentiles, and overtake detection

use crate::error::Result;
use crate::events::RivalOvertaken;
use crate::storage::RankingStore;
use crate::types::{GameId, PlayerId, PlayerRanking};
use crate::utils::current_timestamp;
use std::sync::Arc;
use tracing::debug;

/// Read-side queries over ranking rows for one game's leaderboard
pub struct StandingsService {
    rankings: Arc<dyn RankingStore>,
    /// How many recent history entries bound the overtake search
    overtake_window: usize,
}

impl StandingsService {
    pub fn new(rankings: Arc<dyn RankingStore>, overtake_window: usize) -> Self {
        Self {
            rankings,
            overtake_window,
        }
    }

    /// Ranking rows for a game, best first. Ties break by ascending
    /// player id so the ordering is stable across backends.
    pub fn leaderboard(&self, game_id: &GameId, limit: Option<usize>) -> Result<Vec<PlayerRanking>> {
        let mut rows = self.rankings.rankings_for_game(game_id)?;
        rows.sort_by(|a, b| {
            b.elo_rating
                .cmp(&a.elo_rating)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    /// 1-based leaderboard position, or `None` for an unranked player
    pub fn position(&self, player_id: &PlayerId, game_id: &GameId) -> Result<Option<u32>> {
        let rows = self.leaderboard(game_id, None)?;
        Ok(rows
            .iter()
            .position(|r| r.player_id == *player_id)
            .map(|index| index as u32 + 1))
    }

    /// Fraction of the leaderboard this player sits ahead of:
    /// `round((total - position) / total * 100)`. A board of one yields 0
    /// — there is no one to be ahead of.
    pub fn percentile(&self, player_id: &PlayerId, game_id: &GameId) -> Result<Option<u32>> {
        let rows = self.leaderboard(game_id, None)?;
        let total = rows.len();
        let Some(index) = rows.iter().position(|r| r.player_id == *player_id) else {
            return Ok(None);
        };
        let position = index + 1;
        let percentile = ((total - position) as f64 / total as f64 * 100.0).round() as u32;
        Ok(Some(percentile))
    }

    /// Rivals this player's recent rating climb appears to have passed.
    ///
    /// Looks at the player's most recent history entries (bounded by the
    /// configured window), takes the lowest starting rating among them,
    /// and reports every other player whose current rating sits strictly
    /// inside (that floor, the player's current rating). A heuristic: a
    /// rival already parked inside the band is indistinguishable from one
    /// actually overtaken.
    pub fn detect_overtakes(
        &self,
        player_id: &PlayerId,
        game_id: &GameId,
    ) -> Result<Vec<RivalOvertaken>> {
        let history = self.rankings.history_for_player(player_id, game_id)?;
        if history.is_empty() {
            return Ok(Vec::new());
        }

        let recent = &history[history.len().saturating_sub(self.overtake_window)..];
        let climb_floor = recent.iter().map(|e| e.elo_before).min().unwrap_or(0);
        let current = history.last().map(|e| e.elo_after).unwrap_or(climb_floor);

        if current <= climb_floor {
            // No net climb in the window, nothing to celebrate
            return Ok(Vec::new());
        }

        let rivals: Vec<RivalOvertaken> = self
            .rankings
            .rankings_for_game(game_id)?
            .into_iter()
            .filter(|r| r.player_id != *player_id)
            .filter(|r| r.elo_rating > climb_floor && r.elo_rating < current)
            .map(|r| RivalOvertaken {
                player_id: player_id.clone(),
                game_id: *game_id,
                rival_id: r.player_id,
                player_rating: current,
                rival_rating: r.elo_rating,
                timestamp: current_timestamp(),
            })
            .collect();

        debug!(
            "Overtake scan for {} in game {}: band ({}, {}), {} candidate(s)",
            player_id,
            game_id,
            climb_floor,
            current,
            rivals.len()
        );
        Ok(rivals)
    }
}
