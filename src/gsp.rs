/// Generalized second price auction over ranked ad slots.
///
/// Bids below the reserve are discarded, the remaining bids are ranked from the
/// highest down and the k-th highest bidder gets slot k. Every winner pays, per
/// click, the bid ranked right below its own, or the reserve when nobody is below.

use crate::history::AgentBid;

/// Allocation and prices of one auction
#[derive(Debug, Clone, PartialEq)]
pub struct GspOutcome {
    /// Agent occupying each filled slot, top slot first
    pub occupants: Vec<usize>,
    /// Price per click charged in each filled slot
    pub per_click_prices: Vec<f64>,
    /// Total charge for each filled slot (clicks * price per click)
    pub slot_payments: Vec<f64>,
}

pub struct Gsp;

impl Gsp {
    /// Bids at or above the reserve, highest first.
    /// Sorting is stable, so equal bids keep submission order.
    fn ranked_valid_bids(reserve: f64, bids: &[AgentBid]) -> Vec<AgentBid> {
        let mut valid: Vec<AgentBid> = bids.iter().filter(|b| b.bid >= reserve).copied().collect();
        valid.sort_by(|a, b| b.bid.total_cmp(&a.bid));
        valid
    }

    /// Run the auction for the given slots
    pub fn compute(slot_clicks: &[u32], reserve: f64, bids: &[AgentBid]) -> GspOutcome {
        let ranked = Self::ranked_valid_bids(reserve, bids);
        let filled = ranked.len().min(slot_clicks.len());

        let mut occupants = Vec::with_capacity(filled);
        let mut per_click_prices = Vec::with_capacity(filled);
        let mut slot_payments = Vec::with_capacity(filled);

        for k in 0..filled {
            let price = ranked.get(k + 1).map_or(reserve, |next| next.bid);
            occupants.push(ranked[k].agent_id);
            per_click_prices.push(price);
            slot_payments.push(slot_clicks[k] as f64 * price);
        }

        GspOutcome {
            occupants,
            per_click_prices,
            slot_payments,
        }
    }

    /// Range of bids that would land a newcomer in `slot` against `bids`.
    ///
    /// Returns (min_bid, max_bid). The minimum ties the bid currently ranked at
    /// `slot` (or the reserve when that rank is empty). The maximum is the bid
    /// ranked one above, and None for the top slot since nothing bounds it.
    pub fn bid_range_for_slot(slot: usize, slot_clicks: &[u32], reserve: f64, bids: &[AgentBid]) -> (f64, Option<f64>) {
        debug_assert!(slot < slot_clicks.len(), "slot {} out of range for {} slots", slot, slot_clicks.len());
        let ranked = Self::ranked_valid_bids(reserve, bids);

        let min_bid = ranked.get(slot).map_or(reserve, |b| b.bid);
        let max_bid = if slot == 0 {
            None
        } else {
            Some(ranked.get(slot - 1).map_or(reserve, |b| b.bid))
        };

        (min_bid, max_bid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bids(values: &[(usize, f64)]) -> Vec<AgentBid> {
        values.iter().map(|&(agent_id, bid)| AgentBid { agent_id, bid }).collect()
    }

    #[test]
    fn test_compute_second_price() {
        let outcome = Gsp::compute(&[50, 38], 1.0, &bids(&[(0, 4.0), (1, 9.0), (2, 6.0)]));
        assert_eq!(outcome.occupants, vec![1, 2]);
        assert_eq!(outcome.per_click_prices, vec![6.0, 4.0]);
        assert_eq!(outcome.slot_payments, vec![300.0, 152.0]);
    }

    #[test]
    fn test_compute_last_winner_pays_reserve() {
        let outcome = Gsp::compute(&[50, 38, 28], 2.0, &bids(&[(0, 5.0), (1, 1.0), (2, 3.0)]));
        // agent 1 is below the reserve and does not participate
        assert_eq!(outcome.occupants, vec![0, 2]);
        assert_eq!(outcome.per_click_prices, vec![3.0, 2.0]);
        assert_eq!(outcome.slot_payments, vec![150.0, 76.0]);
    }

    #[test]
    fn test_compute_ties_keep_submission_order() {
        let outcome = Gsp::compute(&[10, 8], 0.0, &bids(&[(3, 5.0), (1, 5.0)]));
        assert_eq!(outcome.occupants, vec![3, 1]);
        assert_eq!(outcome.per_click_prices, vec![5.0, 0.0]);
    }

    #[test]
    fn test_compute_no_valid_bids() {
        let outcome = Gsp::compute(&[10, 8], 20.0, &bids(&[(0, 5.0), (1, 7.0)]));
        assert!(outcome.occupants.is_empty());
        assert!(outcome.slot_payments.is_empty());
    }

    #[test]
    fn test_bid_range_for_slot() {
        let others = bids(&[(1, 3.0), (2, 6.0)]);
        let clicks = [50, 38, 28];
        assert_eq!(Gsp::bid_range_for_slot(0, &clicks, 1.0, &others), (6.0, None));
        assert_eq!(Gsp::bid_range_for_slot(1, &clicks, 1.0, &others), (3.0, Some(6.0)));
        assert_eq!(Gsp::bid_range_for_slot(2, &clicks, 1.0, &others), (1.0, Some(3.0)));
    }

    #[test]
    fn test_bid_range_below_all_bidders() {
        let others = bids(&[(1, 3.0)]);
        let clicks = [50, 38, 28];
        assert_eq!(Gsp::bid_range_for_slot(2, &clicks, 1.5, &others), (1.5, Some(1.5)));
    }
}
