//! Metrics collection using Prometheus

use crate::types::GameMode;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;

/// Main metrics collector for the matchmaking engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Queue-related metrics
    queue_metrics: QueueMetrics,

    /// Lobby-related metrics
    lobby_metrics: LobbyMetrics,
}

/// Queue-related metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Total players queued, by game mode
    pub players_queued_total: IntCounterVec,

    /// Total players that left a queue voluntarily, by game mode
    pub players_left_total: IntCounterVec,

    /// Total players evicted for exceeding the maximum queue time
    pub players_evicted_total: IntCounterVec,

    /// Players currently waiting across all queues
    pub players_waiting: IntGauge,

    /// Wait time observed when an entry is evicted
    pub evicted_wait_seconds: Histogram,
}

/// Lobby-related metrics
#[derive(Clone)]
pub struct LobbyMetrics {
    /// Total lobbies formed, by game mode
    pub lobbies_formed_total: IntCounterVec,

    /// Total lobbies reaped before starting
    pub lobbies_reaped_total: IntCounter,

    /// Total matches completed and rated, by game mode
    pub matches_completed_total: IntCounterVec,

    /// Current number of active lobbies
    pub active_lobbies: IntGauge,
}

impl MetricsCollector {
    /// Create a collector with a fresh registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let queue_metrics = QueueMetrics {
            players_queued_total: IntCounterVec::new(
                Opts::new("players_queued_total", "Total players queued"),
                &["mode"],
            )?,
            players_left_total: IntCounterVec::new(
                Opts::new("players_left_total", "Total players that left a queue"),
                &["mode"],
            )?,
            players_evicted_total: IntCounterVec::new(
                Opts::new(
                    "players_evicted_total",
                    "Total players evicted after exceeding the maximum queue time",
                ),
                &["mode"],
            )?,
            players_waiting: IntGauge::new(
                "players_waiting",
                "Players currently waiting across all queues",
            )?,
            evicted_wait_seconds: Histogram::with_opts(
                HistogramOpts::new(
                    "evicted_wait_seconds",
                    "Wait time observed when an entry is evicted",
                )
                .buckets(vec![30.0, 60.0, 90.0, 120.0, 150.0, 180.0]),
            )?,
        };

        let lobby_metrics = LobbyMetrics {
            lobbies_formed_total: IntCounterVec::new(
                Opts::new("lobbies_formed_total", "Total lobbies formed"),
                &["mode"],
            )?,
            lobbies_reaped_total: IntCounter::new(
                "lobbies_reaped_total",
                "Total lobbies reaped before starting",
            )?,
            matches_completed_total: IntCounterVec::new(
                Opts::new("matches_completed_total", "Total matches completed"),
                &["mode"],
            )?,
            active_lobbies: IntGauge::new("active_lobbies", "Current number of active lobbies")?,
        };

        registry.register(Box::new(queue_metrics.players_queued_total.clone()))?;
        registry.register(Box::new(queue_metrics.players_left_total.clone()))?;
        registry.register(Box::new(queue_metrics.players_evicted_total.clone()))?;
        registry.register(Box::new(queue_metrics.players_waiting.clone()))?;
        registry.register(Box::new(queue_metrics.evicted_wait_seconds.clone()))?;
        registry.register(Box::new(lobby_metrics.lobbies_formed_total.clone()))?;
        registry.register(Box::new(lobby_metrics.lobbies_reaped_total.clone()))?;
        registry.register(Box::new(lobby_metrics.matches_completed_total.clone()))?;
        registry.register(Box::new(lobby_metrics.active_lobbies.clone()))?;

        Ok(Self {
            registry,
            queue_metrics,
            lobby_metrics,
        })
    }

    /// Get the Prometheus registry for scraping
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Direct access to queue metrics
    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    /// Direct access to lobby metrics
    pub fn lobby(&self) -> &LobbyMetrics {
        &self.lobby_metrics
    }

    pub fn record_queue_join(&self, mode: GameMode) {
        self.queue_metrics
            .players_queued_total
            .with_label_values(&[&mode.to_string()])
            .inc();
    }

    pub fn record_queue_leave(&self, mode: GameMode) {
        self.queue_metrics
            .players_left_total
            .with_label_values(&[&mode.to_string()])
            .inc();
    }

    pub fn record_eviction(&self, mode: GameMode, waited_seconds: f64) {
        self.queue_metrics
            .players_evicted_total
            .with_label_values(&[&mode.to_string()])
            .inc();
        self.queue_metrics
            .evicted_wait_seconds
            .observe(waited_seconds);
    }

    pub fn record_lobby_formed(&self, mode: GameMode) {
        self.lobby_metrics
            .lobbies_formed_total
            .with_label_values(&[&mode.to_string()])
            .inc();
    }

    pub fn record_lobbies_reaped(&self, count: u64) {
        self.lobby_metrics.lobbies_reaped_total.inc_by(count);
    }

    pub fn record_match_completed(&self, mode: GameMode) {
        self.lobby_metrics
            .matches_completed_total
            .with_label_values(&[&mode.to_string()])
            .inc();
    }

    pub fn set_players_waiting(&self, count: i64) {
        self.queue_metrics.players_waiting.set(count);
    }

    pub fn set_active_lobbies(&self, count: i64) {
        self.lobby_metrics.active_lobbies.set(count);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("metrics registration on a fresh registry")
    }
}
