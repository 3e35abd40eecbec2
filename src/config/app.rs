//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! matchpoint service, including environment variable loading, optional
//! TOML file loading, and validation.

use crate::engine::EngineConfig;
use crate::matcher::MatcherConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub matchmaking: MatchmakingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for the health and metrics endpoints
    pub health_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Matchmaking-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchmakingSettings {
    /// Interval between matching ticks in milliseconds
    pub tick_interval_ms: u64,
    /// Maximum queue wait before eviction in milliseconds
    pub max_queue_time_ms: u64,
    /// Age past which an unstarted lobby is reaped, in milliseconds
    pub lobby_timeout_ms: u64,
    /// Rating search window at zero wait time
    pub base_window: u32,
    /// Window widening per step
    pub window_step: u32,
    /// Seconds of waiting per widening step
    pub window_step_seconds: u64,
    /// Hard cap on the search window
    pub max_window: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "matchpoint".to_string(),
            log_level: "info".to_string(),
            health_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
            max_queue_time_ms: 120_000,
            lobby_timeout_ms: 600_000,
            base_window: 100,
            window_step: 50,
            window_step_seconds: 10,
            max_window: 500,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HEALTH_PORT") {
            config.service.health_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HEALTH_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Matchmaking settings
        if let Ok(tick) = env::var("TICK_INTERVAL_MS") {
            config.matchmaking.tick_interval_ms = tick
                .parse()
                .map_err(|_| anyhow!("Invalid TICK_INTERVAL_MS value: {}", tick))?;
        }
        if let Ok(max_wait) = env::var("MAX_QUEUE_TIME_MS") {
            config.matchmaking.max_queue_time_ms = max_wait
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_QUEUE_TIME_MS value: {}", max_wait))?;
        }
        if let Ok(timeout) = env::var("LOBBY_TIMEOUT_MS") {
            config.matchmaking.lobby_timeout_ms = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid LOBBY_TIMEOUT_MS value: {}", timeout))?;
        }
        if let Ok(base) = env::var("BASE_WINDOW") {
            config.matchmaking.base_window = base
                .parse()
                .map_err(|_| anyhow!("Invalid BASE_WINDOW value: {}", base))?;
        }
        if let Ok(step) = env::var("WINDOW_STEP") {
            config.matchmaking.window_step = step
                .parse()
                .map_err(|_| anyhow!("Invalid WINDOW_STEP value: {}", step))?;
        }
        if let Ok(step_seconds) = env::var("WINDOW_STEP_SECONDS") {
            config.matchmaking.window_step_seconds = step_seconds
                .parse()
                .map_err(|_| anyhow!("Invalid WINDOW_STEP_SECONDS value: {}", step_seconds))?;
        }
        if let Ok(max) = env::var("MAX_WINDOW") {
            config.matchmaking.max_window = max
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_WINDOW value: {}", max))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Get the tick interval as a Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.matchmaking.tick_interval_ms)
    }

    /// Get the shutdown timeout as a Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Build the matcher configuration from these settings
    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            base_window: self.matchmaking.base_window,
            window_step: self.matchmaking.window_step,
            window_step_seconds: self.matchmaking.window_step_seconds,
            max_window: self.matchmaking.max_window,
            max_queue_time: chrono::Duration::milliseconds(
                self.matchmaking.max_queue_time_ms as i64,
            ),
        }
    }

    /// Build the engine configuration from these settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            matcher: self.matcher_config(),
            lobby_timeout: chrono::Duration::milliseconds(self.matchmaking.lobby_timeout_ms as i64),
        }
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.health_port == 0 {
        return Err(anyhow!("Health port cannot be 0"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.matchmaking.tick_interval_ms == 0 {
        return Err(anyhow!("Tick interval must be greater than 0"));
    }
    if config.matchmaking.max_queue_time_ms == 0 {
        return Err(anyhow!("Max queue time must be greater than 0"));
    }
    if config.matchmaking.lobby_timeout_ms == 0 {
        return Err(anyhow!("Lobby timeout must be greater than 0"));
    }

    // Validate window parameters
    if config.matchmaking.base_window == 0 {
        return Err(anyhow!("Base window must be greater than 0"));
    }
    if config.matchmaking.window_step_seconds == 0 {
        return Err(anyhow!("Window step seconds must be greater than 0"));
    }
    if config.matchmaking.max_window < config.matchmaking.base_window {
        return Err(anyhow!("Max window cannot be smaller than base window"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_matching_policy() {
        let config = AppConfig::default();
        assert_eq!(config.matchmaking.tick_interval_ms, 2_000);
        assert_eq!(config.matchmaking.max_queue_time_ms, 120_000);
        assert_eq!(config.matchmaking.lobby_timeout_ms, 600_000);
        assert_eq!(config.matchmaking.base_window, 100);
        assert_eq!(config.matchmaking.window_step, 50);
        assert_eq!(config.matchmaking.max_window, 500);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.matchmaking.tick_interval_ms = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.matchmaking.max_window = 50;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.service.log_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [matchmaking]
            tick_interval_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(parsed.matchmaking.tick_interval_ms, 500);
        assert_eq!(parsed.matchmaking.max_window, 500);
        assert_eq!(parsed.service.health_port, 8080);
    }

    #[test]
    fn test_matcher_config_conversion() {
        let config = AppConfig::default();
        let matcher = config.matcher_config();
        assert_eq!(matcher.base_window, 100);
        assert_eq!(matcher.max_queue_time.num_milliseconds(), 120_000);
    }
}
