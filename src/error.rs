//! Error types for the tournament engine
//!
//! This module defines all error types using anyhow for consistent error
//! handling throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific tournament scenarios
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("Insufficient entrants: need at least 2 confirmed, got {count}")]
    InsufficientEntrants { count: usize },

    #[error("Invalid score for match {match_id}: {reason}")]
    InvalidScore { match_id: String, reason: String },

    #[error("Match not ready: {match_id}: {reason}")]
    MatchNotReady { match_id: String, reason: String },

    #[error("Cannot regenerate bracket for tournament {tournament_id}: {completed} match(es) already completed")]
    RegenerationConflict {
        tournament_id: String,
        completed: usize,
    },

    #[error("Rating application failed for match {match_id}: {reason}")]
    RatingApplyFailure { match_id: String, reason: String },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("Tournament not found: {tournament_id}")]
    TournamentNotFound { tournament_id: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = TournamentError::InsufficientEntrants { count: 1 };
        assert!(err.to_string().contains("at least 2"));

        let err = TournamentError::RegenerationConflict {
            tournament_id: "t1".to_string(),
            completed: 3,
        };
        assert!(err.to_string().contains("3 match(es)"));
    }

    #[test]
    fn test_errors_convert_into_anyhow() {
        fn fails() -> Result<()> {
            Err(TournamentError::MatchNotFound {
                match_id: "m1".to_string(),
            }
            .into())
        }
        let err = fails().unwrap_err();
        assert!(err.downcast_ref::<TournamentError>().is_some());
    }
}
