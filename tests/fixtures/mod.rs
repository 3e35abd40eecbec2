//! Test fixtures and helpers for integration testing

use matchpoint::engine::{EngineConfig, MatchmakingEngine};
use matchpoint::lobby::Lobby;
use matchpoint::types::{GameMode, JoinRequest, PlayerResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Engine with default configuration
pub fn create_engine() -> Arc<MatchmakingEngine> {
    Arc::new(MatchmakingEngine::new(EngineConfig::default()))
}

/// Join request for a solo player
pub fn join_request(player_id: &str, rating: u32, mode: GameMode) -> JoinRequest {
    JoinRequest {
        player_id: player_id.to_string(),
        display_name: player_id.to_uppercase(),
        rating,
        game_mode: mode,
        party_id: None,
    }
}

/// Join request for a party member
pub fn party_join_request(
    player_id: &str,
    rating: u32,
    mode: GameMode,
    party: &str,
) -> JoinRequest {
    JoinRequest {
        party_id: Some(party.to_string()),
        ..join_request(player_id, rating, mode)
    }
}

/// Results where the first lobby member wins and the rest lose
pub fn first_member_wins(lobby: &Lobby) -> HashMap<String, PlayerResult> {
    lobby
        .members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            (
                member.player_id.clone(),
                PlayerResult {
                    won: i == 0,
                    goals: if i == 0 { 3 } else { 1 },
                    assists: 0,
                },
            )
        })
        .collect()
}
