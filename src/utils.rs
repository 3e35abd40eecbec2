//! Utility functions for the matchmaking engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique lobby ID
pub fn generate_lobby_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: u32, rating2: u32) -> u32 {
    rating1.abs_diff(rating2)
}

/// Check if two ratings fall within the given search window
pub fn ratings_within_window(rating1: u32, rating2: u32, window: u32) -> bool {
    rating_difference(rating1, rating2) <= window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_lobby_id();
        let id2 = generate_lobby_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_rating_difference() {
        assert_eq!(rating_difference(1500, 1400), 100);
        assert_eq!(rating_difference(1400, 1500), 100);
        assert_eq!(rating_difference(1500, 1500), 0);
    }

    #[test]
    fn test_ratings_within_window() {
        assert!(ratings_within_window(1500, 1450, 100));
        assert!(ratings_within_window(1500, 1400, 100));
        assert!(!ratings_within_window(1500, 1350, 100));
        assert!(ratings_within_window(1500, 1500, 0));
    }
}
