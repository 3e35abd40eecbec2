//! Elo expected scores and rating deltas
//!
//! Thin integer-rating wrapper over `skillratings::elo`. Ratings are
//! non-negative integers; deltas are rounded to the nearest point and
//! application floors the result at 0.

use crate::types::Rating;
use skillratings::elo::{expected_score as elo_expected_score, EloRating};

/// K-factor applied to every rating update
pub const K_FACTOR: f64 = 32.0;

/// Probability that `rating` beats `opponent`
///
/// `1 / (1 + 10^((opponent - rating) / 400))`, delegated to skillratings.
pub fn expected_score(rating: Rating, opponent: Rating) -> f64 {
    let player = EloRating {
        rating: rating as f64,
    };
    let other = EloRating {
        rating: opponent as f64,
    };
    let (expected, _) = elo_expected_score(&player, &other);
    expected
}

/// Rating change for a player against `opponent` given the match outcome
pub fn rating_delta(rating: Rating, opponent: Rating, won: bool) -> i32 {
    let expected = expected_score(rating, opponent);
    let actual = if won { 1.0 } else { 0.0 };
    (K_FACTOR * (actual - expected)).round() as i32
}

/// Apply a delta to a rating, flooring at 0. No ceiling.
pub fn apply_delta(rating: Rating, delta: i32) -> Rating {
    (rating as i64 + delta as i64).max(0) as Rating
}
