//! Utility functions for the tournament engine

use crate::types::{MatchId, Slot, TournamentId};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique tournament ID
pub fn generate_tournament_id() -> TournamentId {
    Uuid::new_v4()
}

/// Generate a new unique match ID
pub fn generate_match_id() -> MatchId {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Smallest power of two that fits `entrants` bracket slots
pub fn bracket_size_for(entrants: usize) -> usize {
    entrants.next_power_of_two()
}

/// Number of rounds in a bracket of the given (power-of-two) size
pub fn round_count(bracket_size: usize) -> u32 {
    bracket_size.trailing_zeros()
}

/// Number of matches in round `round` of a bracket of the given size
pub fn matches_in_round(bracket_size: usize, round: u32) -> usize {
    bracket_size >> round
}

/// Where the winner of (round, match_number) lands in the next round.
///
/// Odd match numbers feed participant1 of the target, even feed
/// participant2. Both inputs and outputs are 1-indexed.
pub fn propagation_target(round: u32, match_number: u32) -> (u32, u32, Slot) {
    let next_round = round + 1;
    let next_match_number = match_number.div_ceil(2);
    let slot = if match_number % 2 == 1 {
        Slot::Participant1
    } else {
        Slot::Participant2
    };
    (next_round, next_match_number, slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        assert_ne!(generate_tournament_id(), generate_tournament_id());
        assert_ne!(generate_match_id(), generate_match_id());
    }

    #[test]
    fn test_bracket_size_rounds_up_to_power_of_two() {
        assert_eq!(bracket_size_for(2), 2);
        assert_eq!(bracket_size_for(3), 4);
        assert_eq!(bracket_size_for(5), 8);
        assert_eq!(bracket_size_for(8), 8);
        assert_eq!(bracket_size_for(9), 16);
    }

    #[test]
    fn test_round_count() {
        assert_eq!(round_count(2), 1);
        assert_eq!(round_count(8), 3);
        assert_eq!(round_count(16), 4);
    }

    #[test]
    fn test_matches_in_round() {
        assert_eq!(matches_in_round(8, 1), 4);
        assert_eq!(matches_in_round(8, 2), 2);
        assert_eq!(matches_in_round(8, 3), 1);
    }

    #[test]
    fn test_propagation_target_slot_parity() {
        // Round 1 match 3 winner goes to round 2 match 2, participant1
        assert_eq!(propagation_target(1, 3), (2, 2, Slot::Participant1));
        assert_eq!(propagation_target(1, 4), (2, 2, Slot::Participant2));
        assert_eq!(propagation_target(2, 1), (3, 1, Slot::Participant1));
        assert_eq!(propagation_target(2, 2), (3, 1, Slot::Participant2));
    }
}
