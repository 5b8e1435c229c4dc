/// Click model of the ad slots.
///
/// Top slot volume follows a daily traffic cycle: 30·cos(π·t/24) + 50, rounded,
/// which has a period of 48 rounds. Every slot below receives 0.75 of the slot
/// above it.
///
/// The same model serves two purposes. Utility scoring only compares slots, so it
/// uses the real-valued recurrence. Anything that turns clicks into money (the
/// budget agent's bid, the game driver's realized clicks) uses whole clicks.

use std::f64::consts::PI;

/// Length of one traffic cycle in rounds
pub const PERIOD_ROUNDS: usize = 48;

const TOP_SLOT_BASELINE: f64 = 50.0;
const TOP_SLOT_AMPLITUDE: f64 = 30.0;
const SLOT_DECAY: f64 = 0.75;

/// Forecast clicks for the top slot in round `t`
pub fn top_slot_clicks(t: usize) -> u32 {
    let phase = PI * t as f64 / (PERIOD_ROUNDS as f64 / 2.0);
    (TOP_SLOT_AMPLITUDE * phase.cos() + TOP_SLOT_BASELINE).round() as u32
}

/// Real-valued forecast for `num_slots` slots, top slot first
pub fn forecast_clicks(t: usize, num_slots: usize) -> Vec<f64> {
    let mut clicks = Vec::with_capacity(num_slots);
    let mut current = top_slot_clicks(t) as f64;
    for _ in 0..num_slots {
        clicks.push(current);
        current *= SLOT_DECAY;
    }
    clicks
}

/// Whole-click forecast for `num_slots` slots, top slot first.
/// Each slot is rounded from the top slot directly, not from the rounded slot above.
pub fn forecast_clicks_rounded(t: usize, num_slots: usize) -> Vec<u32> {
    let top = top_slot_clicks(t) as f64;
    (0..num_slots)
        .map(|slot| (top * SLOT_DECAY.powi(slot as i32)).round() as u32)
        .collect()
}

/// With N agents at most N - 1 slots are contested against someone else
pub fn forecast_slot_count(n_agents: usize) -> usize {
    n_agents.saturating_sub(1).max(1)
}
