//! Search window expansion by wait time

use crate::matcher::MatcherConfig;
use chrono::Duration;

/// Maximum allowed rating difference for a player that has waited `waited`
///
/// A monotonic step function: starts at `base_window`, widens by
/// `window_step` every `window_step_seconds`, capped at `max_window`.
pub fn search_window(config: &MatcherConfig, waited: Duration) -> u32 {
    let wait_seconds = waited.num_seconds().max(0) as u64;
    let steps = wait_seconds / config.window_step_seconds.max(1);
    let expanded = (config.base_window as u64)
        .saturating_add(steps.saturating_mul(config.window_step as u64));
    expanded.min(config.max_window as u64) as u32
}
