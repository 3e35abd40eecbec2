//! Rating system built on the Elo model from the skillratings crate
//!
//! This module provides the pure rating math used by match completion:
//! expected scores, K-factor deltas, and display rank tiers.

pub mod elo;
pub mod tier;

// Re-export commonly used items
pub use elo::{apply_delta, expected_score, rating_delta, K_FACTOR};
pub use tier::RankTier;
