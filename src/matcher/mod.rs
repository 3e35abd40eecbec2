//! Periodic matching algorithm
//!
//! Each tick the matcher scans every mode's queue independently: entries
//! are sorted by rating, each unconsumed entry anchors a candidate scan
//! within its wait-time search window, and full groups become lobbies.

pub mod window;

pub use window::search_window;

use crate::lobby::{Lobby, LobbyStore};
use crate::queue::QueueStore;
use crate::types::{GameMode, PartyId, PlayerId, PlayerSnapshot, QueueEntry};
use crate::utils::ratings_within_window;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Tunable matching parameters
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Window at zero wait time
    pub base_window: u32,
    /// Window widening per step
    pub window_step: u32,
    /// Seconds of waiting per widening step
    pub window_step_seconds: u64,
    /// Hard cap on the window
    pub max_window: u32,
    /// Wait time past which an entry is evicted from the queue
    pub max_queue_time: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            base_window: 100,
            window_step: 50,
            window_step_seconds: 10,
            max_window: 500,
            max_queue_time: Duration::milliseconds(120_000),
        }
    }
}

/// Everything one matching pass produced for a mode
#[derive(Debug, Default)]
pub struct PassOutcome {
    /// Lobbies formed this pass
    pub lobbies: Vec<Lobby>,
    /// Entries evicted for exceeding the maximum queue time
    pub evicted: Vec<QueueEntry>,
}

impl PassOutcome {
    fn merge(&mut self, other: PassOutcome) {
        self.lobbies.extend(other.lobbies);
        self.evicted.extend(other.evicted);
    }
}

/// The periodic matching algorithm
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Run one matching pass over every game mode
    ///
    /// Modes are independent; the iteration order must not matter.
    pub fn run_pass(
        &self,
        queues: &mut QueueStore,
        lobbies: &mut LobbyStore,
        now: DateTime<Utc>,
    ) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        for mode in GameMode::ALL {
            outcome.merge(self.run_mode(queues, lobbies, mode, now));
        }
        outcome
    }

    /// Run one matching pass for a single game mode
    pub fn run_mode(
        &self,
        queues: &mut QueueStore,
        lobbies: &mut LobbyStore,
        mode: GameMode,
        now: DateTime<Utc>,
    ) -> PassOutcome {
        let mut outcome = PassOutcome::default();

        // Stable sort keeps insertion order on rating ties, so the oldest
        // entry anchors first among equals.
        let mut order = queues.entries(mode);
        order.sort_by_key(|entry| entry.rating);

        let needed = mode.required_players() - 1;
        let mut consumed: HashSet<PlayerId> = HashSet::new();

        for (index, anchor) in order.iter().enumerate() {
            if consumed.contains(&anchor.player_id) {
                continue;
            }

            let waited = anchor.waited(now);
            if waited > self.config.max_queue_time {
                match queues.dequeue(&anchor.player_id) {
                    Ok(entry) => {
                        debug!(
                            "Evicted {} from {} queue after {}s",
                            entry.player_id,
                            mode,
                            waited.num_seconds()
                        );
                        consumed.insert(entry.player_id.clone());
                        outcome.evicted.push(entry);
                    }
                    Err(e) => warn!("Failed to evict stale entry: {}", e),
                }
                continue;
            }

            let window = search_window(&self.config, waited);

            // Candidates strictly after the anchor in sorted order; the
            // sort puts the nearest ratings adjacent, so collecting in
            // order prefers the closest matches.
            let mut picked: Vec<&QueueEntry> = Vec::with_capacity(needed);
            for candidate in order.iter().skip(index + 1) {
                if picked.len() == needed {
                    break;
                }
                if consumed.contains(&candidate.player_id) {
                    continue;
                }
                if compatible(anchor, candidate, window) {
                    picked.push(candidate);
                }
            }

            if picked.len() < needed {
                // Not enough compatible players yet; the anchor keeps
                // waiting and its window widens next tick.
                continue;
            }

            let mut group: Vec<&QueueEntry> = Vec::with_capacity(needed + 1);
            group.push(anchor);
            group.extend(picked);

            let mut members: Vec<PlayerSnapshot> = Vec::with_capacity(group.len());
            for entry in &group {
                match queues.dequeue(&entry.player_id) {
                    Ok(removed) => {
                        consumed.insert(removed.player_id.clone());
                        members.push(PlayerSnapshot::from(&removed));
                    }
                    Err(e) => warn!("Failed to remove matched player: {}", e),
                }
            }

            let lobby = lobbies.create(mode, members);
            debug!(
                "Formed {} lobby {} around anchor {} (window {})",
                mode, lobby.id, anchor.player_id, window
            );
            outcome.lobbies.push(lobby);
        }

        outcome
    }
}

/// Whether a candidate can join the anchor's proposed group
///
/// Rating gap within the anchor's window, and parties only group with
/// themselves: both unaffiliated, or both declaring the same party.
fn compatible(anchor: &QueueEntry, candidate: &QueueEntry, window: u32) -> bool {
    ratings_within_window(anchor.rating, candidate.rating, window)
        && parties_compatible(&anchor.party_id, &candidate.party_id)
}

fn parties_compatible(a: &Option<PartyId>, b: &Option<PartyId>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::current_timestamp;

    fn entry(id: &str, rating: u32, mode: GameMode) -> QueueEntry {
        QueueEntry {
            player_id: id.to_string(),
            display_name: id.to_uppercase(),
            rating,
            game_mode: mode,
            party_id: None,
            joined_at: current_timestamp(),
        }
    }

    fn party_entry(id: &str, rating: u32, mode: GameMode, party: &str) -> QueueEntry {
        QueueEntry {
            party_id: Some(party.to_string()),
            ..entry(id, rating, mode)
        }
    }

    fn setup() -> (Matcher, QueueStore, LobbyStore) {
        (
            Matcher::default(),
            QueueStore::new(),
            LobbyStore::new(Duration::milliseconds(600_000)),
        )
    }

    #[test]
    fn test_two_players_form_1v1_lobby() {
        let (matcher, mut queues, mut lobbies) = setup();
        queues.enqueue(entry("a", 1500, GameMode::OneVsOne)).unwrap();
        queues.enqueue(entry("b", 1520, GameMode::OneVsOne)).unwrap();

        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, current_timestamp());

        assert_eq!(outcome.lobbies.len(), 1);
        let lobby = &outcome.lobbies[0];
        assert_eq!(lobby.members.len(), 2);
        assert_eq!(lobby.average_rating, 1510);
        // Matched players left the queue atomically with formation
        assert!(queues.is_empty());
        assert_eq!(lobbies.active_count(), 1);
    }

    #[test]
    fn test_rating_gap_beyond_window_blocks_match() {
        let (matcher, mut queues, mut lobbies) = setup();
        queues.enqueue(entry("a", 1000, GameMode::OneVsOne)).unwrap();
        queues.enqueue(entry("b", 1200, GameMode::OneVsOne)).unwrap();

        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, current_timestamp());

        // 200 gap > 100 base window; both stay queued
        assert!(outcome.lobbies.is_empty());
        assert_eq!(queues.len(), 2);
    }

    #[test]
    fn test_window_widens_with_wait() {
        let (matcher, mut queues, mut lobbies) = setup();
        let now = current_timestamp();

        let mut a = entry("a", 1000, GameMode::OneVsOne);
        a.joined_at = now - Duration::seconds(25);
        let mut b = entry("b", 1200, GameMode::OneVsOne);
        b.joined_at = now - Duration::seconds(25);
        queues.enqueue(a).unwrap();
        queues.enqueue(b).unwrap();

        // After 25s the window is 200, just enough for the 200 gap
        let outcome = matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, now);
        assert_eq!(outcome.lobbies.len(), 1);
    }

    #[test]
    fn test_stale_anchor_evicted() {
        let (matcher, mut queues, mut lobbies) = setup();
        let now = current_timestamp();

        let mut stale = entry("loner", 1500, GameMode::OneVsOne);
        stale.joined_at = now - Duration::seconds(125);
        queues.enqueue(stale).unwrap();

        let outcome = matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, now);

        assert!(outcome.lobbies.is_empty());
        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(outcome.evicted[0].player_id, "loner");
        assert!(queues.is_empty());
        assert_eq!(lobbies.active_count(), 0);
    }

    #[test]
    fn test_eviction_does_not_block_remaining_pairs() {
        let (matcher, mut queues, mut lobbies) = setup();
        let now = current_timestamp();

        let mut stale = entry("stale", 1490, GameMode::OneVsOne);
        stale.joined_at = now - Duration::seconds(130);
        queues.enqueue(stale).unwrap();
        queues.enqueue(entry("a", 1500, GameMode::OneVsOne)).unwrap();
        queues.enqueue(entry("b", 1510, GameMode::OneVsOne)).unwrap();

        let outcome = matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, now);

        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(outcome.lobbies.len(), 1);
        let ids: Vec<&str> = outcome.lobbies[0]
            .members
            .iter()
            .map(|m| m.player_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_closest_ratings_preferred() {
        let (matcher, mut queues, mut lobbies) = setup();
        queues.enqueue(entry("far", 1580, GameMode::OneVsOne)).unwrap();
        queues.enqueue(entry("anchor", 1500, GameMode::OneVsOne)).unwrap();
        queues.enqueue(entry("near", 1540, GameMode::OneVsOne)).unwrap();

        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, current_timestamp());

        // Anchor 1500 picks 1540 (adjacent in sort order), not 1580
        assert_eq!(outcome.lobbies.len(), 1);
        let ids: Vec<&str> = outcome.lobbies[0]
            .members
            .iter()
            .map(|m| m.player_id.as_str())
            .collect();
        assert_eq!(ids, vec!["anchor", "near"]);
        assert_eq!(queues.len(), 1);
    }

    #[test]
    fn test_rating_ties_break_oldest_first() {
        let (matcher, mut queues, mut lobbies) = setup();
        let now = current_timestamp();

        for (id, age) in [("old", 30), ("young", 5)] {
            let mut e = entry(id, 1500, GameMode::OneVsOne);
            e.joined_at = now - Duration::seconds(age);
            queues.enqueue(e).unwrap();
        }
        queues.enqueue(entry("third", 1505, GameMode::OneVsOne)).unwrap();

        let outcome = matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, now);

        // The older of the tied 1500s anchors the first lobby
        assert_eq!(outcome.lobbies.len(), 1);
        assert_eq!(outcome.lobbies[0].members[0].player_id, "old");
    }

    #[test]
    fn test_ffa_requires_full_group() {
        let (matcher, mut queues, mut lobbies) = setup();

        for i in 0..7 {
            queues
                .enqueue(entry(&format!("p{}", i), 1500 + i, GameMode::FreeForAll))
                .unwrap();
        }

        // ffa min is 4 but formation only fires at the max of 8
        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::FreeForAll, current_timestamp());
        assert!(outcome.lobbies.is_empty());

        queues.enqueue(entry("p7", 1507, GameMode::FreeForAll)).unwrap();
        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::FreeForAll, current_timestamp());
        assert_eq!(outcome.lobbies.len(), 1);
        assert_eq!(outcome.lobbies[0].members.len(), 8);
        assert!(queues.is_empty());
    }

    #[test]
    fn test_same_party_groups_together() {
        let (matcher, mut queues, mut lobbies) = setup();
        queues
            .enqueue(party_entry("a", 1500, GameMode::OneVsOne, "squad"))
            .unwrap();
        queues
            .enqueue(party_entry("b", 1510, GameMode::OneVsOne, "squad"))
            .unwrap();

        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, current_timestamp());
        assert_eq!(outcome.lobbies.len(), 1);
    }

    #[test]
    fn test_different_parties_never_mix() {
        let (matcher, mut queues, mut lobbies) = setup();
        queues
            .enqueue(party_entry("a", 1500, GameMode::OneVsOne, "red"))
            .unwrap();
        queues
            .enqueue(party_entry("b", 1510, GameMode::OneVsOne, "blue"))
            .unwrap();

        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, current_timestamp());
        assert!(outcome.lobbies.is_empty());
        assert_eq!(queues.len(), 2);
    }

    #[test]
    fn test_party_does_not_group_with_unaffiliated() {
        let (matcher, mut queues, mut lobbies) = setup();
        queues
            .enqueue(party_entry("a", 1500, GameMode::OneVsOne, "squad"))
            .unwrap();
        queues.enqueue(entry("b", 1510, GameMode::OneVsOne)).unwrap();

        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, current_timestamp());
        assert!(outcome.lobbies.is_empty());
    }

    #[test]
    fn test_modes_matched_independently() {
        let (matcher, mut queues, mut lobbies) = setup();
        queues.enqueue(entry("a", 1500, GameMode::OneVsOne)).unwrap();
        queues.enqueue(entry("b", 1500, GameMode::Ranked)).unwrap();

        let outcome = matcher.run_pass(&mut queues, &mut lobbies, current_timestamp());

        // One player per mode; nothing can form across modes
        assert!(outcome.lobbies.is_empty());
        assert_eq!(queues.len(), 2);
    }

    #[test]
    fn test_one_pass_forms_multiple_lobbies() {
        let (matcher, mut queues, mut lobbies) = setup();
        for (id, rating) in [("a", 1000), ("b", 1010), ("c", 2000), ("d", 2010)] {
            queues.enqueue(entry(id, rating, GameMode::OneVsOne)).unwrap();
        }

        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::OneVsOne, current_timestamp());

        assert_eq!(outcome.lobbies.len(), 2);
        assert!(queues.is_empty());
    }

    #[test]
    fn test_all_members_within_anchor_window() {
        let (matcher, mut queues, mut lobbies) = setup();
        for (id, rating) in [("a", 1500), ("b", 1550), ("c", 1590), ("d", 1610)] {
            queues.enqueue(entry(id, rating, GameMode::Casual)).unwrap();
        }

        let outcome =
            matcher.run_mode(&mut queues, &mut lobbies, GameMode::Casual, current_timestamp());

        // 1610 is 110 from the 1500 anchor, outside the base window, so
        // no full group of 4 exists yet.
        assert!(outcome.lobbies.is_empty());
        assert_eq!(queues.len(), 4);
    }
}
