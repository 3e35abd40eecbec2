//! Queue Simulator CLI Tool
//!
//! Drives the embedded matchmaking engine end-to-end with synthetic
//! players: joins a spread of ratings, runs manual ticks, and completes
//! formed matches with synthetic results.
//!
//! Usage:
//!   cargo run --bin queue-sim -- --players 16 --mode 1v1 --ticks 5
//!   cargo run --bin queue-sim -- --mode ffa --players 24

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use matchpoint::engine::{EngineConfig, MatchmakingEngine};
use matchpoint::events::MatchEventSink;
use matchpoint::types::{GameMode, JoinRequest, MatchFound, PlayerResult};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "queue-sim")]
#[command(about = "Simulate players queueing through the matchpoint engine")]
struct Args {
    /// Number of synthetic players to enqueue
    #[arg(short, long, default_value = "16")]
    players: usize,

    /// Game mode to queue for (1v1, 2v2, 3v3, ffa, ranked, casual)
    #[arg(short, long, default_value = "1v1")]
    mode: String,

    /// Number of matching ticks to run
    #[arg(short, long, default_value = "5")]
    ticks: u32,

    /// Complete formed matches with synthetic results
    #[arg(long, default_value = "true")]
    complete: bool,
}

/// Sink that prints every formed lobby to stdout
struct PrintSink;

#[async_trait]
impl MatchEventSink for PrintSink {
    async fn match_found(&self, event: MatchFound) -> matchpoint::Result<()> {
        let members: Vec<String> = event
            .lobby
            .members
            .iter()
            .map(|m| format!("{} ({}, {})", m.display_name, m.rating, m.rank_tier))
            .collect();
        println!(
            "match found: {} lobby {} avg {} -> [{}]",
            event.lobby.game_mode,
            event.lobby.id,
            event.lobby.average_rating,
            members.join(", ")
        );
        Ok(())
    }
}

/// Deterministic rating spread so nearby join indexes get nearby ratings
fn synthetic_rating(index: usize) -> u32 {
    900 + ((index * 37) % 1200) as u32
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mode: GameMode = args.mode.parse()?;

    let engine = Arc::new(MatchmakingEngine::new(EngineConfig::default()));
    engine.register_sink(Arc::new(PrintSink));

    println!(
        "Queueing {} players into {} (lobby size {})",
        args.players,
        mode,
        mode.required_players()
    );

    for i in 0..args.players {
        let request = JoinRequest {
            player_id: format!("sim-{}", i),
            display_name: format!("Sim {}", i),
            rating: synthetic_rating(i),
            game_mode: mode,
            party_id: None,
        };
        engine.join_queue(request)?;
    }

    for tick in 1..=args.ticks {
        let formed = engine.tick().await?;
        println!("tick {}: {} lobbies formed", tick, formed.len());

        if !args.complete {
            continue;
        }

        for lobby in formed {
            // First member wins, everyone else reports a loss
            let results: HashMap<String, PlayerResult> = lobby
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
                .collect();

            let updates = engine.complete_match(lobby.id, results)?;
            for update in updates {
                println!(
                    "  {}: {} -> {} ({}{}, {})",
                    update.player_id,
                    update.old_rating,
                    update.new_rating,
                    if update.delta >= 0 { "+" } else { "" },
                    update.delta,
                    update.new_rank_tier
                );
            }
        }
    }

    let stats = engine.get_stats()?;
    println!(
        "done: {} queued, {} matched into {} lobbies, {} completed, {} still waiting",
        stats.players_queued,
        stats.lobbies_formed * mode.required_players() as u64,
        stats.lobbies_formed,
        stats.matches_completed,
        stats.players_waiting
    );

    Ok(())
}
