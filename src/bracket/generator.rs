//! Single-elimination bracket generation
//!
//! Turns a confirmed entrant list into a full round structure: round 1
//! seeded per policy, every later round pre-created with empty slots.
//! Propagation (see `progression`) only ever fills slots on matches
//! created here.

use crate::error::{Result, TournamentError};
use crate::storage::{MatchStore, RankingStore, TournamentStore};
use crate::types::{BracketMatch, MatchStatus, PlayerId, TournamentId};
use crate::utils::{bracket_size_for, matches_in_round, round_count};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{info, warn};

/// How round-1 placement is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedingPolicy {
    /// Shuffle entrants; a fixed seed makes the draw reproducible
    Random { seed: Option<u64> },
    /// Seed by current Elo, top seeds paired against bottom seeds so the
    /// strongest entrants meet late. Byes go to the top seeds.
    ByRating,
}

/// Builds elimination brackets for tournaments
pub struct BracketGenerator {
    tournaments: Arc<dyn TournamentStore>,
    matches: Arc<dyn MatchStore>,
    rankings: Arc<dyn RankingStore>,
    /// Rating assumed for entrants with no ranking row yet
    unrated_elo: i32,
}

impl BracketGenerator {
    pub fn new(
        tournaments: Arc<dyn TournamentStore>,
        matches: Arc<dyn MatchStore>,
        rankings: Arc<dyn RankingStore>,
        unrated_elo: i32,
    ) -> Self {
        Self {
            tournaments,
            matches,
            rankings,
            unrated_elo,
        }
    }

    /// Generate (or deliberately regenerate) the bracket for a tournament
    /// from its confirmed registrations.
    ///
    /// Regeneration deletes every existing match first and is rejected
    /// once any match has completed — results are never silently
    /// discarded.
    pub fn generate(
        &self,
        tournament_id: TournamentId,
        policy: SeedingPolicy,
    ) -> Result<Vec<BracketMatch>> {
        let entrants = self.tournaments.confirmed_entrants(&tournament_id)?;
        self.generate_with_entrants(tournament_id, entrants, policy)
    }

    /// Generate from an explicit entrant list (callers that already hold
    /// the confirmed registrations)
    pub fn generate_with_entrants(
        &self,
        tournament_id: TournamentId,
        entrants: Vec<PlayerId>,
        policy: SeedingPolicy,
    ) -> Result<Vec<BracketMatch>> {
        let tournament = self.tournaments.get_tournament(&tournament_id)?.ok_or(
            TournamentError::TournamentNotFound {
                tournament_id: tournament_id.to_string(),
            },
        )?;

        if entrants.len() < 2 {
            return Err(TournamentError::InsufficientEntrants {
                count: entrants.len(),
            }
            .into());
        }

        let existing = self.matches.matches_for_tournament(&tournament_id)?;
        let completed = existing
            .iter()
            .filter(|m| m.status == MatchStatus::Completed)
            .count();
        if completed > 0 {
            return Err(TournamentError::RegenerationConflict {
                tournament_id: tournament_id.to_string(),
                completed,
            }
            .into());
        }
        if !existing.is_empty() {
            let deleted = self.matches.delete_matches_for(&tournament_id)?;
            warn!(
                "Regenerating bracket for tournament {}: deleted {} pending matches",
                tournament_id, deleted
            );
        }

        let entrant_count = entrants.len();
        let bracket_size = bracket_size_for(entrant_count);
        let rounds = round_count(bracket_size);
        let byes = bracket_size - entrant_count;

        info!(
            "Generating bracket for tournament {} ({}): {} entrants, size {}, {} rounds, {} byes",
            tournament_id, tournament.name, entrant_count, bracket_size, rounds, byes
        );

        let mut bracket = match policy {
            SeedingPolicy::Random { seed } => {
                self.seed_random(tournament_id, entrants, bracket_size, seed)
            }
            SeedingPolicy::ByRating => {
                self.seed_by_rating(tournament_id, entrants, tournament.game_id, bracket_size)?
            }
        };

        // Later rounds exist up front with empty slots; propagation fills
        // them but never creates them.
        for round in 2..=rounds {
            for match_number in 1..=matches_in_round(bracket_size, round) {
                bracket.push(BracketMatch::new(
                    tournament_id,
                    round,
                    match_number as u32,
                    None,
                    None,
                ));
            }
        }

        self.matches.create_matches(bracket.clone())?;
        Ok(bracket)
    }

    /// Shuffled draw: full pairs first, then bye slots for the leftover
    /// entrants
    fn seed_random(
        &self,
        tournament_id: TournamentId,
        mut entrants: Vec<PlayerId>,
        bracket_size: usize,
        seed: Option<u64>,
    ) -> Vec<BracketMatch> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        entrants.shuffle(&mut rng);

        let half = bracket_size / 2;
        let byes = bracket_size - entrants.len();
        let full_pairs = half - byes;

        let mut drain = entrants.into_iter();
        let mut bracket = Vec::with_capacity(half);
        for match_number in 1..=half {
            let participant1 = drain.next();
            let participant2 = if match_number <= full_pairs {
                drain.next()
            } else {
                None
            };
            bracket.push(BracketMatch::new(
                tournament_id,
                1,
                match_number as u32,
                participant1,
                participant2,
            ));
        }
        bracket
    }

    /// Elo-seeded draw: seed i meets seed (bracket_size + 1 - i); missing
    /// bottom seeds become byes for the top
    fn seed_by_rating(
        &self,
        tournament_id: TournamentId,
        entrants: Vec<PlayerId>,
        game_id: crate::types::GameId,
        bracket_size: usize,
    ) -> Result<Vec<BracketMatch>> {
        let mut seeded: Vec<(PlayerId, i32)> = Vec::with_capacity(entrants.len());
        for entrant in entrants {
            let elo = self
                .rankings
                .get_ranking(&entrant, &game_id)?
                .map(|r| r.elo_rating)
                .unwrap_or(self.unrated_elo);
            seeded.push((entrant, elo));
        }
        // Descending elo, ties by player id for a deterministic draw
        seeded.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let half = bracket_size / 2;
        let mut bracket = Vec::with_capacity(half);
        for match_number in 1..=half {
            let top = seeded.get(match_number - 1).map(|(p, _)| p.clone());
            let bottom = seeded.get(bracket_size - match_number).map(|(p, _)| p.clone());
            bracket.push(BracketMatch::new(
                tournament_id,
                1,
                match_number as u32,
                top,
                bottom,
            ));
        }
        Ok(bracket)
    }
}
