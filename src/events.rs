//! Event sink seam between the engine and the transport layer
//!
//! The engine yields newly formed lobbies each tick and forwards them to
//! every registered sink, so multiple subscribers (push notifications,
//! session bootstrap, analytics) can observe matches without overwriting
//! each other.

use crate::error::Result;
use crate::types::MatchFound;
use async_trait::async_trait;
use std::sync::Mutex;

/// Trait for consumers of match-found events
#[async_trait]
pub trait MatchEventSink: Send + Sync {
    /// Called once per formed lobby, after the engine has released its
    /// internal state lock.
    async fn match_found(&self, event: MatchFound) -> Result<()>;
}

/// Sink that records events in memory, for tests and local tooling
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<MatchFound>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far
    pub fn events(&self) -> Vec<MatchFound> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

#[async_trait]
impl MatchEventSink for RecordingEventSink {
    async fn match_found(&self, event: MatchFound) -> Result<()> {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
        Ok(())
    }
}
