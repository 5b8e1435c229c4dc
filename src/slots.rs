/// Slot ranges and expected utilities, assuming every other agent repeats
/// the bid it made in the previous round.

use crate::clicks::forecast_clicks;
use crate::gsp::Gsp;
use crate::history::History;
use crate::utils::argmax_index;

/// Bid interval that lands an agent in `slot`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotInfo {
    pub slot: usize,
    pub min_bid: f64,
    pub max_bid: f64,
}

/// One SlotInfo per slot offered in round `t - 1`, top slot first.
///
/// min_bid ties the competitor ranked at that slot last round. max_bid is the
/// min_bid of the slot above; the top slot has no real ceiling and gets twice
/// its min_bid instead, as does any slot the auction reports as unbounded.
pub fn slot_info(agent_id: usize, t: usize, history: &History, reserve: f64) -> Vec<SlotInfo> {
    let prev_round = history.round(t - 1);
    let other_bids = prev_round.other_bids(agent_id);
    let clicks = &prev_round.clicks;

    (0..clicks.len())
        .map(|slot| {
            let (min_bid, max_bid) = Gsp::bid_range_for_slot(slot, clicks, reserve, &other_bids);
            SlotInfo {
                slot,
                min_bid,
                max_bid: max_bid.unwrap_or(2.0 * min_bid),
            }
        })
        .collect()
}

/// Expected utility of winning each slot at its minimum bid in round `t`:
/// forecast clicks * (value - min_bid). Aligned with `slots`.
pub fn expected_utils(value: f64, t: usize, slots: &[SlotInfo]) -> Vec<f64> {
    let clicks = forecast_clicks(t, slots.len());
    slots
        .iter()
        .map(|info| clicks[info.slot] * (value - info.min_bid))
        .collect()
}

/// Slot with the highest expected utility; the lowest slot index wins ties.
/// None only when there are no slots at all.
pub fn target_slot(value: f64, t: usize, slots: &[SlotInfo]) -> Option<SlotInfo> {
    let utils = expected_utils(value, t, slots);
    argmax_index(&utils).map(|i| slots[i])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clicks::forecast_clicks;
    use crate::history::{AgentBid, RoundRecord};

    /// History with a single round 0 built from the given bids, clicks and payments
    pub(crate) fn history_with_round(n_agents: usize, bids: &[(usize, f64)], clicks: Vec<u32>, slot_payments: Vec<f64>) -> History {
        let mut history = History::new(n_agents);
        let occupants = (0..slot_payments.len()).collect();
        let per_click_prices = vec![0.0; slot_payments.len()];
        history.add_round(RoundRecord {
            round: 0,
            bids: bids.iter().map(|&(agent_id, bid)| AgentBid { agent_id, bid }).collect(),
            clicks,
            occupants,
            per_click_prices,
            slot_payments,
        });
        history
    }

    #[test]
    fn test_slot_info_excludes_own_bid() {
        // agent 0 bid 8.0 last round, competitors bid 3.0 and 1.0
        let history = history_with_round(3, &[(0, 8.0), (1, 3.0), (2, 1.0)], vec![50, 10], vec![]);
        let info = slot_info(0, 1, &history, 1.0);
        assert_eq!(info, vec![
            SlotInfo { slot: 0, min_bid: 3.0, max_bid: 6.0 },
            SlotInfo { slot: 1, min_bid: 1.0, max_bid: 3.0 },
        ]);
    }

    #[test]
    fn test_slot_info_top_slot_ceiling_doubles() {
        let history = history_with_round(2, &[(0, 2.0), (1, 7.5)], vec![40], vec![]);
        let info = slot_info(0, 1, &history, 0.0);
        assert_eq!(info, vec![SlotInfo { slot: 0, min_bid: 7.5, max_bid: 15.0 }]);
    }

    #[test]
    fn test_slot_info_without_own_bid() {
        let history = history_with_round(3, &[(1, 3.0), (2, 1.0)], vec![50, 10], vec![]);
        let info = slot_info(0, 1, &history, 1.0);
        assert_eq!(info[0].min_bid, 3.0);
        assert_eq!(info[1].min_bid, 1.0);
    }

    #[test]
    fn test_expected_utils_formula() {
        let slots = vec![
            SlotInfo { slot: 0, min_bid: 3.0, max_bid: 6.0 },
            SlotInfo { slot: 1, min_bid: 1.0, max_bid: 3.0 },
            SlotInfo { slot: 2, min_bid: 12.0, max_bid: 1.0 },
        ];
        for t in [0, 5, 12, 30, 47, 60] {
            let clicks = forecast_clicks(t, slots.len());
            let utils = expected_utils(10.0, t, &slots);
            for (s, info) in slots.iter().enumerate() {
                assert_eq!(utils[s], clicks[s] * (10.0 - info.min_bid));
            }
            // value below min_bid stays a (negative) candidate
            assert!(utils[2] < 0.0);
        }
    }

    #[test]
    fn test_target_slot_prefers_first_on_tie() {
        // with t = 12 clicks are 50 and 37.5; min bids chosen so utilities tie
        let slots = vec![
            SlotInfo { slot: 0, min_bid: 4.0, max_bid: 8.0 },
            SlotInfo { slot: 1, min_bid: 2.0, max_bid: 4.0 },
        ];
        let utils = expected_utils(10.0, 12, &slots);
        assert_eq!(utils, vec![300.0, 300.0]);
        assert_eq!(target_slot(10.0, 12, &slots).map(|s| s.slot), Some(0));
    }

    #[test]
    fn test_target_slot_empty() {
        assert_eq!(target_slot(10.0, 3, &[]), None);
    }
}
