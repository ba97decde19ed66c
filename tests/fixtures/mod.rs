//! Test fixtures for integration testing

use bracket_engine::achievements::AchievementService;
use bracket_engine::bracket::{BracketGenerator, MatchProgressionEngine};
use bracket_engine::config::RatingSettings;
use bracket_engine::error::Result;
use bracket_engine::events::RecordingEventPublisher;
use bracket_engine::rating::RatingEngine;
use bracket_engine::standings::StandingsService;
use bracket_engine::storage::{InMemoryStore, TournamentStore};
use bracket_engine::types::{
    BracketType, GameId, Registration, RegistrationStatus, Tournament, TournamentId,
    TournamentStatus,
};
use bracket_engine::utils::{current_timestamp, generate_tournament_id};
use std::sync::Arc;
use uuid::Uuid;

/// A complete engine wired against one in-memory store
pub struct TestSystem {
    pub store: Arc<InMemoryStore>,
    pub publisher: Arc<RecordingEventPublisher>,
    pub generator: BracketGenerator,
    pub progression: Arc<MatchProgressionEngine>,
    pub standings: StandingsService,
    pub achievements: AchievementService,
    pub game_id: GameId,
}

impl TestSystem {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let game_id = Uuid::new_v4();

        let rating_engine =
            RatingEngine::new(store.clone(), RatingSettings::default()).unwrap();
        let progression = Arc::new(MatchProgressionEngine::new(
            store.clone(),
            store.clone(),
            rating_engine,
            publisher.clone(),
        ));
        let generator = BracketGenerator::new(store.clone(), store.clone(), store.clone(), 1200);
        let standings = StandingsService::new(store.clone(), 5);
        let achievements = AchievementService::new(store.clone(), store.clone());

        Self {
            store,
            publisher,
            generator,
            progression,
            standings,
            achievements,
            game_id,
        }
    }

    /// Create a live tournament with the given confirmed entrants
    pub fn create_tournament(&self, name: &str, entrants: &[&str]) -> Result<TournamentId> {
        let tournament_id = generate_tournament_id();
        self.store.upsert_tournament(Tournament {
            id: tournament_id,
            game_id: self.game_id,
            name: name.to_string(),
            bracket_type: BracketType::SingleElimination,
            status: TournamentStatus::Live,
            max_entrants: 64,
            created_at: current_timestamp(),
        })?;
        for entrant in entrants {
            self.store.add_registration(Registration {
                tournament_id,
                entrant: entrant.to_string(),
                status: RegistrationStatus::Confirmed,
                registered_at: current_timestamp(),
            })?;
        }
        Ok(tournament_id)
    }
}
