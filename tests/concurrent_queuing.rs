//! Concurrent queueing tests
//!
//! Joins and leaves race each other and the matching tick; the queue
//! uniqueness invariant and total player accounting must hold for every
//! interleaving.

mod fixtures;

use fixtures::{create_engine, join_request};
use futures::future::join_all;
use matchpoint::types::GameMode;
use std::sync::Arc;

#[tokio::test]
async fn test_concurrent_joins_all_distinct_players() {
    let engine = create_engine();

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine.join_queue(join_request(&format!("p{}", i), 1500, GameMode::Casual))
            })
        })
        .collect();

    let results = join_all(handles).await;
    let successes = results
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(()))))
        .count();

    assert_eq!(successes, 50);
    assert_eq!(engine.get_stats().unwrap().players_queued, 50);
}

#[tokio::test]
async fn test_concurrent_joins_same_player_single_entry() {
    let engine = create_engine();

    // Same player id raced from many tasks across different modes
    let handles: Vec<_> = (0..20)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let mode = GameMode::ALL[i % GameMode::ALL.len()];
            tokio::spawn(async move { engine.join_queue(join_request("dupe", 1500, mode)) })
        })
        .collect();

    let results = join_all(handles).await;
    let successes = results
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(()))))
        .count();

    // Exactly one entry wins, everywhere
    assert_eq!(successes, 1);
    let stats = engine.queue_stats(None).unwrap();
    let total: usize = stats.iter().map(|s| s.players_in_queue).sum();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_joins_racing_the_tick_account_for_everyone() {
    let engine = create_engine();

    let join_handles: Vec<_> = (0..40)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine.join_queue(join_request(
                    &format!("racer{}", i),
                    1500 + (i % 5) as u32,
                    GameMode::OneVsOne,
                ))
            })
        })
        .collect();

    let tick_handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.tick().await })
        })
        .collect();

    join_all(join_handles).await;
    join_all(tick_handles).await;

    // Settle anyone the racing ticks did not see
    engine.tick().await.unwrap();

    let stats = engine.get_stats().unwrap();
    let matched = stats.lobbies_formed * 2;
    assert_eq!(matched as usize + stats.players_waiting, 40);

    // Nobody is simultaneously matched and queued
    let queue_stats = engine.queue_stats(Some(GameMode::OneVsOne)).unwrap();
    assert_eq!(queue_stats[0].players_in_queue, stats.players_waiting);
}

#[tokio::test]
async fn test_leave_during_churn_is_exact() {
    let engine = create_engine();

    for i in 0..10 {
        engine
            .join_queue(join_request(&format!("p{}", i), 2000, GameMode::ThreeVsThree))
            .unwrap();
    }

    let leave_handles: Vec<_> = (0..10)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.leave_queue(&format!("p{}", i)).map(|_| ()) })
        })
        .collect();

    let results = join_all(leave_handles).await;
    let successes = results
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(()))))
        .count();

    assert_eq!(successes, 10);
    assert!(engine.queue_stats(None).unwrap().iter().all(|s| s.players_in_queue == 0));
}
