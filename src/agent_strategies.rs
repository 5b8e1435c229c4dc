/// This is a file where agent bidding strategies reside.
/// A strategy turns an agent's private value (and possibly budget) plus the
/// public history of the game into the single bid the agent submits in a round.
///
/// Balanced bidding: target the slot s* maximizing clicks_s * (value - min_bid_s),
/// then pick the bid b that makes the agent indifferent between s* and the slot
/// right above it:
///     clicks_s* * (value - min_bid_s*) = clicks_(s*-1) * (value - b)
/// Against opponents that keep their bids, this keeps the agent in s* while
/// pushing up the price paid by whoever sits above it.

use crate::agents::AgentProfile;
use crate::clicks::{forecast_clicks, forecast_clicks_rounded, forecast_slot_count, PERIOD_ROUNDS};
use crate::history::History;
use crate::logger::{Logger, LogEvent};
use crate::slots::{slot_info, target_slot, SlotInfo};
use crate::warnln;

/// Trait for strategies that compute an agent's bid
pub trait BidStrategyTrait {
    /// Bid for round 0, when there is no history to react to
    fn initial_bid(&self, profile: &AgentProfile, reserve: f64) -> f64;

    /// Bid for round `t >= 1` given everything that was settled in rounds 0..t
    fn get_bid(&self, profile: &AgentProfile, t: usize, history: &History, reserve: f64, logger: &mut Logger) -> f64;

    fn get_bidding_type(&self) -> String;
}

/// Bid that equalizes utility of the target slot and the slot above it.
/// Returns None when the slot above has no clicks and the equation has no solution.
pub fn balanced_bid(value: f64, min_bid: f64, clicks_target: f64, clicks_above: f64) -> Option<f64> {
    if clicks_above <= 0.0 {
        return None;
    }
    Some(value - clicks_target * (value - min_bid) / clicks_above)
}

/// Always bids the private value
pub struct StrategyTruthful;

impl BidStrategyTrait for StrategyTruthful {
    fn initial_bid(&self, profile: &AgentProfile, _reserve: f64) -> f64 {
        profile.value
    }

    fn get_bid(&self, profile: &AgentProfile, _t: usize, _history: &History, _reserve: f64, _logger: &mut Logger) -> f64 {
        profile.value
    }

    fn get_bidding_type(&self) -> String {
        "Truthful".to_string()
    }
}

/// Balanced bid for the slot with the highest expected utility.
///
/// `clicks` is the forecast for round `t` used to price the target slot and the
/// slot above it, top slot first, with at least one entry per slot in `slots`.
/// Bids the value when there is nothing to target, when the target slot is the
/// top slot or when the agent cannot afford the target's minimum bid.
fn balanced_target_bid(profile: &AgentProfile, t: usize, slots: &[SlotInfo], clicks: &[f64], logger: &mut Logger) -> f64 {
    let target = match target_slot(profile.value, t, slots) {
        Some(target) => target,
        None => return profile.value,
    };

    if target.min_bid >= profile.value || target.slot == 0 {
        return profile.value;
    }

    match balanced_bid(profile.value, target.min_bid, clicks[target.slot], clicks[target.slot - 1]) {
        Some(bid) => bid,
        None => {
            warnln!(logger, LogEvent::Round, "Agent {}: no clicks forecast above slot {} in round {}, bidding value", profile.agent_id, target.slot, t);
            profile.value
        }
    }
}

/// Balanced bidding without any regard for the budget
pub struct StrategyBalanced;

impl BidStrategyTrait for StrategyBalanced {
    fn initial_bid(&self, profile: &AgentProfile, _reserve: f64) -> f64 {
        profile.value / 2.0
    }

    fn get_bid(&self, profile: &AgentProfile, t: usize, history: &History, reserve: f64, logger: &mut Logger) -> f64 {
        let slots = slot_info(profile.agent_id, t, history, reserve);
        let clicks = forecast_clicks(t, slots.len());
        balanced_target_bid(profile, t, &slots, &clicks, logger)
    }

    fn get_bidding_type(&self) -> String {
        "Balanced bidding".to_string()
    }
}

/// Balanced bidding that keeps the agent within its budget over the traffic cycle.
///
/// - While the market has hardly any settled prices (two or fewer paid slots last
///   round) it bids reserve + 1.
/// - Otherwise it bids the balanced bid, using whole-click forecasts.
/// - The candidate is replaced with reserve + 1 when paying it at last round's
///   top-slot volume would break the budget, or when merely paying the reserve for
///   the rest of the cycle would already exceed the money left.
pub struct StrategyBalancedBudget;

impl BidStrategyTrait for StrategyBalancedBudget {
    fn initial_bid(&self, profile: &AgentProfile, _reserve: f64) -> f64 {
        profile.value / 2.0
    }

    fn get_bid(&self, profile: &AgentProfile, t: usize, history: &History, reserve: f64, logger: &mut Logger) -> f64 {
        let prev_round = history.round(t - 1);
        let fallback = reserve + 1.0;

        if prev_round.slot_payments.len() <= 2 {
            return fallback;
        }

        let slots = slot_info(profile.agent_id, t, history, reserve);
        let num_slots = forecast_slot_count(history.n_agents).max(slots.len());
        let clicks: Vec<f64> = forecast_clicks_rounded(t, num_slots).into_iter().map(f64::from).collect();
        let bid = balanced_target_bid(profile, t, &slots, &clicks, logger);

        let spent = history.spent_by(profile.agent_id);
        let money_left = profile.budget - spent;
        let top_clicks = prev_round.clicks.first().copied().unwrap_or(0) as f64;
        let rounds_left = PERIOD_ROUNDS as f64 - t as f64;

        let round_cost = bid * top_clicks;
        let reserve_commitment = rounds_left * reserve * top_clicks;
        if round_cost + spent > profile.budget || reserve_commitment > money_left {
            return fallback;
        }
        bid
    }

    fn get_bidding_type(&self) -> String {
        "Balanced bidding with budget".to_string()
    }
}
