//! Matchpoint - skill-based matchmaking engine
//!
//! This crate assigns players waiting in per-mode queues to balanced game
//! lobbies, expanding each player's rating search window with wait time,
//! and computes Elo rating updates when matches complete.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod lobby;
pub mod matcher;
pub mod metrics;
pub mod queue;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{MatchmakingError, Result};
pub use types::*;

// Re-export key components
pub use engine::{EngineConfig, EngineStats, MatchmakingEngine, TickDriver};
pub use events::MatchEventSink;
pub use lobby::{Lobby, LobbyStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
