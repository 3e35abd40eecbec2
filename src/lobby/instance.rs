//! Lobby value and status state machine

use crate::error::{MatchmakingError, Result};
use crate::types::{GameMode, LobbyId, PlayerSnapshot, Rating};
use crate::utils::{current_timestamp, generate_lobby_id};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Possible states of a lobby
///
/// `Ready` and `InProgress` are driven by the external game session;
/// the engine itself only exercises `Waiting` -> `Completed` and the
/// reap path. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyStatus {
    /// Formed, waiting for the game session to pick it up
    Waiting,
    /// All members connected, about to start
    Ready,
    /// Match is being played
    InProgress,
    /// Match finished and rated (terminal state)
    Completed,
}

/// A formed match instance with a fixed member set
///
/// Lobbies are never created partially filled: `members.len()` equals
/// `required_player_count` from formation on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lobby {
    pub id: LobbyId,
    pub game_mode: GameMode,
    pub members: Vec<PlayerSnapshot>,
    pub average_rating: Rating,
    pub created_at: DateTime<Utc>,
    pub status: LobbyStatus,
    pub required_player_count: usize,
}

impl Lobby {
    /// Create a new lobby from a full member group
    pub(crate) fn new(game_mode: GameMode, members: Vec<PlayerSnapshot>) -> Self {
        let required_player_count = members.len();
        let rating_sum: u64 = members.iter().map(|m| m.rating as u64).sum();
        let average_rating = if members.is_empty() {
            0
        } else {
            (rating_sum as f64 / members.len() as f64).round() as Rating
        };

        Self {
            id: generate_lobby_id(),
            game_mode,
            members,
            average_rating,
            created_at: current_timestamp(),
            status: LobbyStatus::Waiting,
            required_player_count,
        }
    }

    /// Whether the given player is a member of this lobby
    pub fn contains_player(&self, player_id: &str) -> bool {
        self.members.iter().any(|m| m.player_id == player_id)
    }

    /// Age of the lobby as of `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// Whether the lobby should be discarded by the reaper
    ///
    /// A lobby that made it to `InProgress` is never reaped; completion is
    /// the only way out of that state.
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.status != LobbyStatus::InProgress && self.age(now) > timeout
    }

    /// Transition `Waiting` -> `Ready`
    pub fn mark_ready(&mut self) -> Result<()> {
        match self.status {
            LobbyStatus::Waiting => {
                self.status = LobbyStatus::Ready;
                Ok(())
            }
            LobbyStatus::Completed => Err(MatchmakingError::AlreadyCompleted {
                lobby_id: self.id.to_string(),
            }
            .into()),
            other => Err(MatchmakingError::InternalError {
                message: format!("Lobby {} cannot become ready from {:?}", self.id, other),
            }
            .into()),
        }
    }

    /// Transition `Waiting`/`Ready` -> `InProgress`
    pub fn mark_in_progress(&mut self) -> Result<()> {
        match self.status {
            LobbyStatus::Waiting | LobbyStatus::Ready => {
                self.status = LobbyStatus::InProgress;
                Ok(())
            }
            LobbyStatus::Completed => Err(MatchmakingError::AlreadyCompleted {
                lobby_id: self.id.to_string(),
            }
            .into()),
            other => Err(MatchmakingError::InternalError {
                message: format!("Lobby {} cannot start from {:?}", self.id, other),
            }
            .into()),
        }
    }

    /// Transition to `Completed`; accepted from any state except `Completed`
    pub(crate) fn mark_completed(&mut self) -> Result<()> {
        if self.status == LobbyStatus::Completed {
            return Err(MatchmakingError::AlreadyCompleted {
                lobby_id: self.id.to_string(),
            }
            .into());
        }
        self.status = LobbyStatus::Completed;
        Ok(())
    }
}
