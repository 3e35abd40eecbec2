//! Common types used throughout the matchmaking engine

use crate::error::MatchmakingError;
use crate::rating::RankTier;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for lobbies
pub type LobbyId = Uuid;

/// Identifier shared by players queueing as a party
pub type PartyId = String;

/// Skill rating value; floored at 0, unbounded above
pub type Rating = u32;

/// Game modes players can queue for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    OneVsOne,
    TwoVsTwo,
    ThreeVsThree,
    FreeForAll,
    Ranked,
    Casual,
}

impl GameMode {
    /// All modes, in a fixed order for iteration. Matching is independent
    /// per mode, so this order carries no semantic weight.
    pub const ALL: [GameMode; 6] = [
        GameMode::OneVsOne,
        GameMode::TwoVsTwo,
        GameMode::ThreeVsThree,
        GameMode::FreeForAll,
        GameMode::Ranked,
        GameMode::Casual,
    ];

    /// Minimum players the mode could start with
    pub fn min_players(&self) -> usize {
        match self {
            GameMode::OneVsOne | GameMode::Ranked => 2,
            GameMode::TwoVsTwo => 4,
            GameMode::ThreeVsThree => 6,
            GameMode::FreeForAll => 4,
            GameMode::Casual => 2,
        }
    }

    /// Maximum players a lobby of this mode holds
    pub fn max_players(&self) -> usize {
        match self {
            GameMode::OneVsOne | GameMode::Ranked => 2,
            GameMode::TwoVsTwo => 4,
            GameMode::ThreeVsThree => 6,
            GameMode::FreeForAll => 8,
            GameMode::Casual => 4,
        }
    }

    /// Player count a lobby is formed with. The matcher fires only once a
    /// full group is available; `min_players` does not trigger formation.
    pub fn required_players(&self) -> usize {
        self.max_players()
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameMode::OneVsOne => "1v1",
            GameMode::TwoVsTwo => "2v2",
            GameMode::ThreeVsThree => "3v3",
            GameMode::FreeForAll => "ffa",
            GameMode::Ranked => "ranked",
            GameMode::Casual => "casual",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for GameMode {
    type Err = MatchmakingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "1v1" => Ok(GameMode::OneVsOne),
            "2v2" => Ok(GameMode::TwoVsTwo),
            "3v3" => Ok(GameMode::ThreeVsThree),
            "ffa" => Ok(GameMode::FreeForAll),
            "ranked" => Ok(GameMode::Ranked),
            "casual" => Ok(GameMode::Casual),
            other => Err(MatchmakingError::InvalidGameMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Request to join a matchmaking queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub player_id: PlayerId,
    pub display_name: String,
    /// Rating snapshot read from the player's profile at join time
    pub rating: Rating,
    pub game_mode: GameMode,
    pub party_id: Option<PartyId>,
}

/// A player waiting in a queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub player_id: PlayerId,
    pub display_name: String,
    pub rating: Rating,
    pub game_mode: GameMode,
    pub party_id: Option<PartyId>,
    pub joined_at: DateTime<Utc>,
}

impl QueueEntry {
    /// How long this entry has been waiting as of `now`
    pub fn waited(&self, now: DateTime<Utc>) -> Duration {
        now - self.joined_at
    }
}

/// Immutable snapshot of a player captured into a formed lobby
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub display_name: String,
    pub rating: Rating,
    pub rank_tier: RankTier,
}

impl From<&QueueEntry> for PlayerSnapshot {
    fn from(entry: &QueueEntry) -> Self {
        Self {
            player_id: entry.player_id.clone(),
            display_name: entry.display_name.clone(),
            rating: entry.rating,
            rank_tier: RankTier::from_rating(entry.rating),
        }
    }
}

/// Per-player outcome reported when a match finishes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerResult {
    pub won: bool,
    pub goals: u32,
    pub assists: u32,
}

/// Rating change computed for one player after match completion
///
/// Ephemeral output of `complete_match`; the caller is responsible for
/// persisting it back into durable storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub player_id: PlayerId,
    pub old_rating: Rating,
    pub new_rating: Rating,
    pub delta: i32,
    pub new_rank_tier: RankTier,
}

/// Read-only queue statistics for one game mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    pub game_mode: GameMode,
    pub players_in_queue: usize,
    pub average_rating: Rating,
    pub average_wait_seconds: f64,
}

/// Event emitted once per formed lobby
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFound {
    pub lobby: crate::lobby::Lobby,
    pub timestamp: DateTime<Utc>,
}
