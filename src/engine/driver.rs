//! Tick driver: the repeating timer behind the matching algorithm

use crate::engine::MatchmakingEngine;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

/// Drives the engine's matching pass on a fixed cadence
///
/// Starting an already running driver and stopping a stopped one are both
/// no-ops. All queue and lobby state lives in the engine, so it survives
/// stop/start cycles intact.
pub struct TickDriver {
    engine: Arc<MatchmakingEngine>,
    tick_interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TickDriver {
    pub fn new(engine: Arc<MatchmakingEngine>, tick_interval: Duration) -> Self {
        Self {
            engine,
            tick_interval,
            task: Mutex::new(None),
        }
    }

    /// Start the periodic tick task
    pub fn start(&self) {
        let mut task = match self.task.lock() {
            Ok(task) => task,
            Err(_) => {
                error!("Failed to acquire driver task lock");
                return;
            }
        };

        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Tick driver already running, start is a no-op");
            return;
        }

        let engine = Arc::clone(&self.engine);
        let tick_interval = self.tick_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = interval(tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick fires immediately; skip it so the
            // first matching pass happens one full interval after start.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match engine.tick().await {
                    Ok(formed) if !formed.is_empty() => {
                        debug!("Tick formed {} lobbies", formed.len());
                    }
                    Ok(_) => {}
                    Err(e) => error!("Matching tick failed: {}", e),
                }
            }
        });

        *task = Some(handle);
        info!("Tick driver started ({}ms interval)", self.tick_interval.as_millis());
    }

    /// Stop the periodic tick task; queued players remain queued
    pub fn stop(&self) {
        let mut task = match self.task.lock() {
            Ok(task) => task,
            Err(_) => {
                error!("Failed to acquire driver task lock");
                return;
            }
        };

        match task.take() {
            Some(handle) => {
                handle.abort();
                info!("Tick driver stopped");
            }
            None => debug!("Tick driver not running, stop is a no-op"),
        }
    }

    /// Whether the tick task is currently running
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .map(|task| task.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }
}
