//! Matchmaking engine facade
//!
//! One explicit engine value owns all queue and lobby state behind a
//! single lock; every externally visible operation is serialized through
//! it, which is the concurrency model the matching algorithm assumes.
//! Notification delivery and metrics recording happen after the lock is
//! released, using values computed inside the critical section.

pub mod driver;

pub use driver::TickDriver;

use crate::error::{MatchmakingError, Result};
use crate::events::MatchEventSink;
use crate::lobby::{Lobby, LobbyStore};
use crate::matcher::{Matcher, MatcherConfig};
use crate::metrics::MetricsCollector;
use crate::queue::QueueStore;
use crate::types::{
    GameMode, JoinRequest, LobbyId, MatchFound, PlayerId, PlayerResult, QueueEntry, QueueStats,
    RatingUpdate,
};
use crate::utils::current_timestamp;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{error, info, warn};

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub matcher: MatcherConfig,
    /// Age past which a lobby that never started is discarded
    pub lobby_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            lobby_timeout: Duration::milliseconds(600_000),
        }
    }
}

/// Counters describing engine activity since construction
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineStats {
    /// Total players that joined a queue
    pub players_queued: u64,
    /// Total players that left voluntarily
    pub players_left: u64,
    /// Total players evicted for exceeding the maximum queue time
    pub players_evicted: u64,
    /// Total lobbies formed
    pub lobbies_formed: u64,
    /// Total lobbies reaped before starting
    pub lobbies_reaped: u64,
    /// Total matches completed and rated
    pub matches_completed: u64,
    /// Current number of active lobbies
    pub active_lobbies: usize,
    /// Current number of players waiting in queues
    pub players_waiting: usize,
}

/// Queue and lobby state guarded by the engine lock
struct EngineState {
    queues: QueueStore,
    lobbies: LobbyStore,
}

/// The matchmaking engine
///
/// Constructed once per process and shared by handle; there is no global
/// singleton. State survives driver stop/start cycles.
pub struct MatchmakingEngine {
    state: Mutex<EngineState>,
    sinks: RwLock<Vec<Arc<dyn MatchEventSink>>>,
    matcher: Matcher,
    stats: RwLock<EngineStats>,
    metrics: Arc<MetricsCollector>,
}

impl MatchmakingEngine {
    /// Create an engine with a default metrics collector
    pub fn new(config: EngineConfig) -> Self {
        let metrics = Arc::new(MetricsCollector::new().unwrap_or_else(|_| {
            warn!("Failed to create metrics collector, using default");
            MetricsCollector::default()
        }));
        Self::with_metrics(config, metrics)
    }

    /// Create an engine recording into the given metrics collector
    pub fn with_metrics(config: EngineConfig, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            state: Mutex::new(EngineState {
                queues: QueueStore::new(),
                lobbies: LobbyStore::new(config.lobby_timeout),
            }),
            sinks: RwLock::new(Vec::new()),
            matcher: Matcher::new(config.matcher),
            stats: RwLock::new(EngineStats::default()),
            metrics,
        }
    }

    /// Subscribe a sink to match-found events
    pub fn register_sink(&self, sink: Arc<dyn MatchEventSink>) {
        if let Ok(mut sinks) = self.sinks.write() {
            sinks.push(sink);
        }
    }

    /// Add a player to their mode's queue
    pub fn join_queue(&self, request: JoinRequest) -> Result<()> {
        let entry = QueueEntry {
            player_id: request.player_id.clone(),
            display_name: request.display_name,
            rating: request.rating,
            game_mode: request.game_mode,
            party_id: request.party_id,
            joined_at: current_timestamp(),
        };

        let waiting = {
            let mut state = self.lock_state()?;
            state.queues.enqueue(entry)?;
            state.queues.len()
        };

        self.metrics.record_queue_join(request.game_mode);
        self.metrics.set_players_waiting(waiting as i64);
        if let Ok(mut stats) = self.stats.write() {
            stats.players_queued += 1;
            stats.players_waiting = waiting;
        }

        info!(
            "Player {} joined {} queue (rating {})",
            request.player_id, request.game_mode, request.rating
        );
        Ok(())
    }

    /// Remove a player from whichever queue they are in
    ///
    /// Applied synchronously against the same state the matcher reads, so
    /// a leave always takes effect before the next tick.
    pub fn leave_queue(&self, player_id: &str) -> Result<QueueEntry> {
        let (entry, waiting) = {
            let mut state = self.lock_state()?;
            let entry = state.queues.dequeue(player_id)?;
            (entry, state.queues.len())
        };

        self.metrics.record_queue_leave(entry.game_mode);
        self.metrics.set_players_waiting(waiting as i64);
        if let Ok(mut stats) = self.stats.write() {
            stats.players_left += 1;
            stats.players_waiting = waiting;
        }

        info!("Player {} left the {} queue", player_id, entry.game_mode);
        Ok(entry)
    }

    /// Read-only queue statistics, for one mode or all modes
    pub fn queue_stats(&self, mode: Option<GameMode>) -> Result<Vec<QueueStats>> {
        let state = self.lock_state()?;
        Ok(state.queues.stats(mode, current_timestamp()))
    }

    /// Look up a lobby in the active set or match history
    pub fn get_lobby(&self, lobby_id: LobbyId) -> Result<Option<Lobby>> {
        let state = self.lock_state()?;
        Ok(state.lobbies.get(lobby_id).cloned())
    }

    /// Mark a lobby ready, on behalf of the external game session
    pub fn mark_lobby_ready(&self, lobby_id: LobbyId) -> Result<()> {
        let mut state = self.lock_state()?;
        state.lobbies.mark_ready(lobby_id)
    }

    /// Mark a lobby in progress, on behalf of the external game session
    pub fn mark_lobby_in_progress(&self, lobby_id: LobbyId) -> Result<()> {
        let mut state = self.lock_state()?;
        state.lobbies.mark_in_progress(lobby_id)
    }

    /// Complete a match and return the rating updates
    ///
    /// The caller is responsible for persisting the updates; the engine is
    /// not a system of record for ratings.
    pub fn complete_match(
        &self,
        lobby_id: LobbyId,
        results: HashMap<PlayerId, PlayerResult>,
    ) -> Result<Vec<RatingUpdate>> {
        let (updates, game_mode, active) = {
            let mut state = self.lock_state()?;
            let updates = state.lobbies.complete(lobby_id, &results)?;
            let game_mode = state.lobbies.get(lobby_id).map(|lobby| lobby.game_mode);
            (updates, game_mode, state.lobbies.active_count())
        };

        if let Some(mode) = game_mode {
            self.metrics.record_match_completed(mode);
        }
        self.metrics.set_active_lobbies(active as i64);
        if let Ok(mut stats) = self.stats.write() {
            stats.matches_completed += 1;
            stats.active_lobbies = active;
        }

        info!(
            "Match {} completed with {} rating updates",
            lobby_id,
            updates.len()
        );
        Ok(updates)
    }

    /// Run one matching pass at the current time
    pub async fn tick(&self) -> Result<Vec<Lobby>> {
        self.tick_at(current_timestamp()).await
    }

    /// Run one matching pass at an explicit time
    ///
    /// Exposed for deterministic tests and simulations; the driver calls
    /// `tick` on its fixed cadence.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> Result<Vec<Lobby>> {
        let (outcome, reaped, waiting, active) = {
            let mut state = self.lock_state()?;
            let state = &mut *state;
            let outcome = self
                .matcher
                .run_pass(&mut state.queues, &mut state.lobbies, now);
            let reaped = state.lobbies.reap(now);
            (
                outcome,
                reaped,
                state.queues.len(),
                state.lobbies.active_count(),
            )
        };

        for lobby in &outcome.lobbies {
            self.metrics.record_lobby_formed(lobby.game_mode);
        }
        for entry in &outcome.evicted {
            let waited_seconds = entry.waited(now).num_milliseconds().max(0) as f64 / 1000.0;
            self.metrics.record_eviction(entry.game_mode, waited_seconds);
        }
        if !reaped.is_empty() {
            self.metrics.record_lobbies_reaped(reaped.len() as u64);
        }
        self.metrics.set_players_waiting(waiting as i64);
        self.metrics.set_active_lobbies(active as i64);

        if let Ok(mut stats) = self.stats.write() {
            stats.lobbies_formed += outcome.lobbies.len() as u64;
            stats.players_evicted += outcome.evicted.len() as u64;
            stats.lobbies_reaped += reaped.len() as u64;
            stats.players_waiting = waiting;
            stats.active_lobbies = active;
        }

        // Deliver events only after the state lock is released
        let sinks = self
            .sinks
            .read()
            .map(|sinks| sinks.clone())
            .unwrap_or_default();
        for lobby in &outcome.lobbies {
            let event = MatchFound {
                lobby: lobby.clone(),
                timestamp: now,
            };
            for sink in &sinks {
                if let Err(e) = sink.match_found(event.clone()).await {
                    error!("Match event sink failed for lobby {}: {}", lobby.id, e);
                }
            }
        }

        Ok(outcome.lobbies)
    }

    /// Current engine statistics
    pub fn get_stats(&self) -> Result<EngineStats> {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .map_err(|_| {
                MatchmakingError::InternalError {
                    message: "Failed to acquire stats lock".to_string(),
                }
                .into()
            })
    }

    /// Metrics collector backing this engine
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, EngineState>> {
        self.state.lock().map_err(|_| {
            MatchmakingError::InternalError {
                message: "Failed to acquire engine state lock".to_string(),
            }
            .into()
        })
    }
}
