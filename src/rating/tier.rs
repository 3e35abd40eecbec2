//! Display rank tiers derived from rating values

use crate::types::Rating;
use serde::{Deserialize, Serialize};

/// Visible rank tier for a rating. Ranges are half-open; a boundary value
/// belongs to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
}

impl RankTier {
    /// Map a rating to its tier
    pub fn from_rating(rating: Rating) -> Self {
        match rating {
            0..=799 => RankTier::Bronze,
            800..=1199 => RankTier::Silver,
            1200..=1599 => RankTier::Gold,
            1600..=1999 => RankTier::Platinum,
            2000..=2399 => RankTier::Diamond,
            2400..=2799 => RankTier::Master,
            _ => RankTier::Grandmaster,
        }
    }
}

impl std::fmt::Display for RankTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RankTier::Bronze => "Bronze",
            RankTier::Silver => "Silver",
            RankTier::Gold => "Gold",
            RankTier::Platinum => "Platinum",
            RankTier::Diamond => "Diamond",
            RankTier::Master => "Master",
            RankTier::Grandmaster => "Grandmaster",
        };
        write!(f, "{}", name)
    }
}
