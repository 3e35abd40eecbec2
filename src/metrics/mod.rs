//! Metrics and monitoring for the matchmaking engine
//!
//! Prometheus collection plus a small HTTP server exposing health,
//! metrics, and engine statistics endpoints.

pub mod collector;
pub mod health;

pub use collector::{LobbyMetrics, MetricsCollector, QueueMetrics};
pub use health::{HealthServer, HealthServerConfig};
