//! Event publisher trait and test-friendly implementations

use crate::error::Result;
use crate::events::{
    EngineEvent, MatchCompleted, RankTierChanged, RivalOvertaken, TournamentCompleted,
};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;

/// Trait for publishing engine events to the outside world
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a MatchCompleted event
    async fn publish_match_completed(&self, event: MatchCompleted) -> Result<()>;

    /// Publish a TournamentCompleted event
    async fn publish_tournament_completed(&self, event: TournamentCompleted) -> Result<()>;

    /// Publish a RankTierChanged event
    async fn publish_rank_tier_changed(&self, event: RankTierChanged) -> Result<()>;

    /// Publish a RivalOvertaken event
    async fn publish_rival_overtaken(&self, event: RivalOvertaken) -> Result<()>;
}

/// Publisher that drops every event (embedders that poll instead)
#[derive(Debug, Clone, Default)]
pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish_match_completed(&self, event: MatchCompleted) -> Result<()> {
        debug!("Dropping MatchCompleted event for match {}", event.match_id);
        Ok(())
    }

    async fn publish_tournament_completed(&self, event: TournamentCompleted) -> Result<()> {
        debug!(
            "Dropping TournamentCompleted event for tournament {}",
            event.tournament_id
        );
        Ok(())
    }

    async fn publish_rank_tier_changed(&self, event: RankTierChanged) -> Result<()> {
        debug!(
            "Dropping RankTierChanged event for player {}",
            event.player_id
        );
        Ok(())
    }

    async fn publish_rival_overtaken(&self, event: RivalOvertaken) -> Result<()> {
        debug!(
            "Dropping RivalOvertaken event for player {}",
            event.player_id
        );
        Ok(())
    }
}

/// Publisher that captures published events for inspection in tests
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far, in order
    pub fn published_events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Count events of a specific type by name
    pub fn count_events_of_type(&self, event_type: &str) -> usize {
        self.published_events()
            .iter()
            .filter(|event| match event {
                EngineEvent::MatchCompleted(_) => event_type == "MatchCompleted",
                EngineEvent::TournamentCompleted(_) => event_type == "TournamentCompleted",
                EngineEvent::RankTierChanged(_) => event_type == "RankTierChanged",
                EngineEvent::RivalOvertaken(_) => event_type == "RivalOvertaken",
            })
            .count()
    }

    fn record(&self, event: EngineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish_match_completed(&self, event: MatchCompleted) -> Result<()> {
        self.record(EngineEvent::MatchCompleted(event));
        Ok(())
    }

    async fn publish_tournament_completed(&self, event: TournamentCompleted) -> Result<()> {
        self.record(EngineEvent::TournamentCompleted(event));
        Ok(())
    }

    async fn publish_rank_tier_changed(&self, event: RankTierChanged) -> Result<()> {
        self.record(EngineEvent::RankTierChanged(event));
        Ok(())
    }

    async fn publish_rival_overtaken(&self, event: RivalOvertaken) -> Result<()> {
        self.record(EngineEvent::RivalOvertaken(event));
        Ok(())
    }
}
