//! Queue storage and per-mode statistics

use crate::error::{MatchmakingError, Result};
use crate::types::{GameMode, PlayerId, QueueEntry, QueueStats};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

/// Per-mode FIFO queues of waiting players
///
/// Insertion order is preserved within each mode so the matcher can break
/// rating ties oldest-first. The `members` index enforces the invariant
/// that a player is queued at most once across all modes.
#[derive(Debug, Default)]
pub struct QueueStore {
    queues: HashMap<GameMode, VecDeque<QueueEntry>>,
    members: HashMap<PlayerId, GameMode>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player to their mode's queue
    ///
    /// Fails with `AlreadyQueued` if the player holds an entry in any mode.
    pub fn enqueue(&mut self, entry: QueueEntry) -> Result<()> {
        if self.members.contains_key(&entry.player_id) {
            return Err(MatchmakingError::AlreadyQueued {
                player_id: entry.player_id.clone(),
            }
            .into());
        }

        self.members
            .insert(entry.player_id.clone(), entry.game_mode);
        self.queues
            .entry(entry.game_mode)
            .or_default()
            .push_back(entry);

        Ok(())
    }

    /// Remove and return a player's entry, whichever mode it is in
    ///
    /// Fails with `NotQueued` if the player holds no entry; callers that
    /// want idempotent leave semantics can treat that as a no-op.
    pub fn dequeue(&mut self, player_id: &str) -> Result<QueueEntry> {
        let mode = self
            .members
            .remove(player_id)
            .ok_or_else(|| MatchmakingError::NotQueued {
                player_id: player_id.to_string(),
            })?;

        let queue = self
            .queues
            .get_mut(&mode)
            .ok_or_else(|| MatchmakingError::InternalError {
                message: format!("Queue index out of sync for mode {}", mode),
            })?;

        let position = queue
            .iter()
            .position(|entry| entry.player_id == player_id)
            .ok_or_else(|| MatchmakingError::InternalError {
                message: format!("Indexed player {} missing from {} queue", player_id, mode),
            })?;

        // VecDeque::remove keeps the order of the remaining entries
        queue
            .remove(position)
            .ok_or_else(|| {
                MatchmakingError::InternalError {
                    message: format!("Queue position {} vanished during dequeue", position),
                }
                .into()
            })
    }

    /// Whether the player currently holds a queue entry in any mode
    pub fn contains(&self, player_id: &str) -> bool {
        self.members.contains_key(player_id)
    }

    /// Total number of waiting players across all modes
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of waiting players in one mode
    pub fn mode_len(&self, mode: GameMode) -> usize {
        self.queues.get(&mode).map_or(0, VecDeque::len)
    }

    /// Snapshot of one mode's entries in insertion order
    pub fn entries(&self, mode: GameMode) -> Vec<QueueEntry> {
        self.queues
            .get(&mode)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Read-only statistics for one mode
    pub fn mode_stats(&self, mode: GameMode, now: DateTime<Utc>) -> QueueStats {
        let (count, average_rating, average_wait_seconds) = match self.queues.get(&mode) {
            Some(entries) if !entries.is_empty() => {
                let count = entries.len();
                let rating_sum: u64 = entries.iter().map(|e| e.rating as u64).sum();
                let wait_sum: f64 = entries
                    .iter()
                    .map(|e| e.waited(now).num_milliseconds().max(0) as f64 / 1000.0)
                    .sum();
                (
                    count,
                    (rating_sum as f64 / count as f64).round() as u32,
                    wait_sum / count as f64,
                )
            }
            _ => (0, 0, 0.0),
        };

        QueueStats {
            game_mode: mode,
            players_in_queue: count,
            average_rating,
            average_wait_seconds,
        }
    }

    /// Statistics for one mode, or for all modes when `mode` is `None`
    pub fn stats(&self, mode: Option<GameMode>, now: DateTime<Utc>) -> Vec<QueueStats> {
        match mode {
            Some(mode) => vec![self.mode_stats(mode, now)],
            None => GameMode::ALL
                .iter()
                .map(|mode| self.mode_stats(*mode, now))
                .collect(),
        }
    }
}
