/// Playback pacing.
///
/// The gap between two played-back pads shrinks as the sequence grows:
/// every `pace_tier_span` moves drop one tier, and the last tier holds
/// forever. With the defaults that is 600 / 500 / 400 / 300 ms for
/// lengths 0-4 / 5-9 / 10-14 / 15+.

use std::time::Duration;

use crate::config::TimingConfig;

/// Which pacing tier a sequence of `len` moves falls into.
pub fn pace_tier(len: usize, span: usize) -> usize {
    len / span.max(1)
}

/// Delay between two consecutive pads during playback.
pub fn inter_move_delay(timing: &TimingConfig, len: usize) -> Duration {
    let tiers = &timing.pace_tiers_ms;
    let tier = pace_tier(len, timing.pace_tier_span).min(tiers.len().saturating_sub(1));
    let ms = tiers.get(tier).copied().unwrap_or(crate::config::DEFAULT_PACE_MS);
    Duration::from_millis(ms)
}
