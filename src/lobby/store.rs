//! Lobby store: active lobbies, match history, completion and reaping

use crate::error::{MatchmakingError, Result};
use crate::lobby::instance::{Lobby, LobbyStatus};
use crate::rating::{apply_delta, rating_delta, RankTier};
use crate::types::{GameMode, LobbyId, PlayerId, PlayerResult, PlayerSnapshot, Rating, RatingUpdate};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

/// Tracks lobbies through their lifecycle
///
/// Active lobbies live in `active`; completed ones move to `history` and
/// stay queryable as match history. Reaped lobbies are discarded outright.
#[derive(Debug)]
pub struct LobbyStore {
    active: HashMap<LobbyId, Lobby>,
    history: HashMap<LobbyId, Lobby>,
    /// Age past which a lobby that never started is discarded
    reap_timeout: Duration,
}

impl LobbyStore {
    pub fn new(reap_timeout: Duration) -> Self {
        Self {
            active: HashMap::new(),
            history: HashMap::new(),
            reap_timeout,
        }
    }

    /// Create a lobby from a full member group and track it
    pub fn create(&mut self, game_mode: GameMode, members: Vec<PlayerSnapshot>) -> Lobby {
        let lobby = Lobby::new(game_mode, members);
        debug!(
            "Created {} lobby {} with {} members, average rating {}",
            game_mode,
            lobby.id,
            lobby.members.len(),
            lobby.average_rating
        );
        self.active.insert(lobby.id, lobby.clone());
        lobby
    }

    /// Look up a lobby by id, in the active set or match history
    pub fn get(&self, lobby_id: LobbyId) -> Option<&Lobby> {
        self.active
            .get(&lobby_id)
            .or_else(|| self.history.get(&lobby_id))
    }

    /// Number of lobbies currently active
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of completed lobbies retained as history
    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    /// Mark an active lobby ready
    pub fn mark_ready(&mut self, lobby_id: LobbyId) -> Result<()> {
        self.active_mut(lobby_id)?.mark_ready()
    }

    /// Mark an active lobby in progress
    pub fn mark_in_progress(&mut self, lobby_id: LobbyId) -> Result<()> {
        self.active_mut(lobby_id)?.mark_in_progress()
    }

    /// Complete a match and compute rating updates for reported members
    ///
    /// Each member with a result entry is rated against a composite
    /// opponent: the rounded average rating of all other lobby members.
    /// Members without a result entry are skipped, never penalized; a
    /// repeated completion fails with `AlreadyCompleted` so results are
    /// never double-applied.
    pub fn complete(
        &mut self,
        lobby_id: LobbyId,
        results: &HashMap<PlayerId, PlayerResult>,
    ) -> Result<Vec<RatingUpdate>> {
        if self.history.contains_key(&lobby_id) {
            return Err(MatchmakingError::AlreadyCompleted {
                lobby_id: lobby_id.to_string(),
            }
            .into());
        }

        let mut lobby =
            self.active
                .remove(&lobby_id)
                .ok_or_else(|| MatchmakingError::LobbyNotFound {
                    lobby_id: lobby_id.to_string(),
                })?;

        let updates: Vec<RatingUpdate> = lobby
            .members
            .iter()
            .filter_map(|member| {
                let result = results.get(&member.player_id)?;
                let opponent = composite_opponent_rating(&lobby.members, &member.player_id);
                let delta = rating_delta(member.rating, opponent, result.won);
                let new_rating = apply_delta(member.rating, delta);
                Some(RatingUpdate {
                    player_id: member.player_id.clone(),
                    old_rating: member.rating,
                    new_rating,
                    delta,
                    new_rank_tier: RankTier::from_rating(new_rating),
                })
            })
            .collect();

        lobby.mark_completed()?;
        info!(
            "Completed {} lobby {} with {} rating updates",
            lobby.game_mode,
            lobby_id,
            updates.len()
        );
        self.history.insert(lobby_id, lobby);

        Ok(updates)
    }

    /// Discard active lobbies that never started within the timeout
    ///
    /// Returns the removed lobbies. No rating effects; not an error for
    /// any caller, just a policy cleanup.
    pub fn reap(&mut self, now: DateTime<Utc>) -> Vec<Lobby> {
        let stale_ids: Vec<LobbyId> = self
            .active
            .values()
            .filter(|lobby| lobby.is_stale(now, self.reap_timeout))
            .map(|lobby| lobby.id)
            .collect();

        let mut reaped = Vec::with_capacity(stale_ids.len());
        for id in stale_ids {
            if let Some(lobby) = self.active.remove(&id) {
                info!(
                    "Reaped stale {} lobby {} ({}s old, status {:?})",
                    lobby.game_mode,
                    id,
                    lobby.age(now).num_seconds(),
                    lobby.status
                );
                reaped.push(lobby);
            }
        }
        reaped
    }

    fn active_mut(&mut self, lobby_id: LobbyId) -> Result<&mut Lobby> {
        if let Some(lobby) = self.active.get_mut(&lobby_id) {
            return Ok(lobby);
        }
        if self.history.contains_key(&lobby_id) {
            return Err(MatchmakingError::AlreadyCompleted {
                lobby_id: lobby_id.to_string(),
            }
            .into());
        }
        Err(MatchmakingError::LobbyNotFound {
            lobby_id: lobby_id.to_string(),
        }
        .into())
    }
}

/// Average rating of every member except `player_id`, rounded
fn composite_opponent_rating(members: &[PlayerSnapshot], player_id: &str) -> Rating {
    let others: Vec<u64> = members
        .iter()
        .filter(|m| m.player_id != player_id)
        .map(|m| m.rating as u64)
        .collect();
    if others.is_empty() {
        return 0;
    }
    let sum: u64 = others.iter().sum();
    (sum as f64 / others.len() as f64).round() as Rating
}
