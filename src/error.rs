//! Error types for the matchmaking engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific matchmaking scenarios
///
/// All variants are local, recoverable conditions returned to the caller;
/// none are fatal to the engine.
#[derive(Debug, thiserror::Error)]
pub enum MatchmakingError {
    #[error("Player already queued: {player_id}")]
    AlreadyQueued { player_id: String },

    #[error("Player not queued: {player_id}")]
    NotQueued { player_id: String },

    #[error("Invalid game mode: {mode}")]
    InvalidGameMode { mode: String },

    #[error("Lobby not found: {lobby_id}")]
    LobbyNotFound { lobby_id: String },

    #[error("Lobby already completed: {lobby_id}")]
    AlreadyCompleted { lobby_id: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal engine error: {message}")]
    InternalError { message: String },
}
