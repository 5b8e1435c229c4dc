use crate::gsp::GspOutcome;

/// A bid submitted by one agent in one round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentBid {
    pub agent_id: usize,
    pub bid: f64,
}

/// Everything that happened in one settled round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRecord {
    pub round: usize,
    /// Bids in submission order
    pub bids: Vec<AgentBid>,
    /// Clicks each slot received, top slot first (one entry per offered slot)
    pub clicks: Vec<u32>,
    /// Agent in each filled slot
    pub occupants: Vec<usize>,
    pub per_click_prices: Vec<f64>,
    /// Amount actually charged for each filled slot
    pub slot_payments: Vec<f64>,
}

impl RoundRecord {
    pub fn new(round: usize, bids: Vec<AgentBid>, clicks: Vec<u32>, outcome: GspOutcome) -> Self {
        Self {
            round,
            bids,
            clicks,
            occupants: outcome.occupants,
            per_click_prices: outcome.per_click_prices,
            slot_payments: outcome.slot_payments,
        }
    }

    /// Bids of everyone except `agent_id`, in submission order
    pub fn other_bids(&self, agent_id: usize) -> Vec<AgentBid> {
        self.bids.iter().filter(|b| b.agent_id != agent_id).copied().collect()
    }

    /// Bid the agent submitted in this round, if it bid at all
    pub fn bid_of(&self, agent_id: usize) -> Option<f64> {
        self.bids.iter().find(|b| b.agent_id == agent_id).map(|b| b.bid)
    }
}

/// Append-only record of a game
pub struct History {
    rounds: Vec<RoundRecord>,
    /// Cumulative spend indexed by agent_id
    agents_spent: Vec<f64>,
    pub n_agents: usize,
}

impl History {
    pub fn new(n_agents: usize) -> Self {
        Self {
            rounds: Vec::new(),
            agents_spent: vec![0.0; n_agents],
            n_agents,
        }
    }

    /// Record of round `t`. Panics if the round has not been played yet.
    pub fn round(&self, t: usize) -> &RoundRecord {
        match self.rounds.get(t) {
            Some(record) => record,
            None => panic!("Round {} requested but only {} rounds played", t, self.rounds.len()),
        }
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Total amount charged to the agent so far; agents never charged read as 0
    pub fn spent_by(&self, agent_id: usize) -> f64 {
        self.agents_spent.get(agent_id).copied().unwrap_or(0.0)
    }

    /// Cumulative spend of every agent, indexed by agent_id
    pub fn agents_spent(&self) -> &[f64] {
        &self.agents_spent
    }

    /// Overwrite an agent's cumulative spend, for setting up bidding situations
    #[cfg(test)]
    pub fn set_spent(&mut self, agent_id: usize, amount: f64) {
        if agent_id >= self.agents_spent.len() {
            self.agents_spent.resize(agent_id + 1, 0.0);
        }
        self.agents_spent[agent_id] = amount;
    }

    /// Commit a settled round and add its payments to the winners' spend
    pub fn add_round(&mut self, record: RoundRecord) {
        assert_eq!(record.round, self.rounds.len(), "Rounds must be added in order");
        for (&agent_id, &payment) in record.occupants.iter().zip(record.slot_payments.iter()) {
            if agent_id >= self.agents_spent.len() {
                self.agents_spent.resize(agent_id + 1, 0.0);
            }
            self.agents_spent[agent_id] += payment;
        }
        self.rounds.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round: usize) -> RoundRecord {
        RoundRecord {
            round,
            bids: vec![
                AgentBid { agent_id: 0, bid: 4.0 },
                AgentBid { agent_id: 1, bid: 9.0 },
                AgentBid { agent_id: 2, bid: 6.0 },
            ],
            clicks: vec![50, 38],
            occupants: vec![1, 2],
            per_click_prices: vec![6.0, 4.0],
            slot_payments: vec![300.0, 152.0],
        }
    }

    #[test]
    fn test_add_round_accumulates_spend() {
        let mut history = History::new(3);
        history.add_round(record(0));
        history.add_round(record(1));

        assert_eq!(history.num_rounds(), 2);
        assert_eq!(history.spent_by(0), 0.0);
        assert_eq!(history.spent_by(1), 600.0);
        assert_eq!(history.spent_by(2), 304.0);
        assert_eq!(history.spent_by(7), 0.0);
        assert_eq!(history.agents_spent(), &[0.0, 600.0, 304.0]);
    }

    #[test]
    fn test_other_bids_excludes_self_and_keeps_order() {
        let r = record(0);
        let others = r.other_bids(1);
        assert_eq!(others, vec![AgentBid { agent_id: 0, bid: 4.0 }, AgentBid { agent_id: 2, bid: 6.0 }]);
        // an agent that did not bid filters nothing out
        assert_eq!(r.other_bids(9).len(), 3);
    }

    #[test]
    fn test_bid_lookup() {
        let r = record(0);
        assert_eq!(r.bid_of(1), Some(9.0));
        assert_eq!(r.bid_of(5), None);
    }

    #[test]
    #[should_panic(expected = "Rounds must be added in order")]
    fn test_add_round_out_of_order() {
        let mut history = History::new(3);
        history.add_round(record(1));
    }

    #[test]
    #[should_panic(expected = "only 0 rounds played")]
    fn test_round_not_played() {
        let history = History::new(3);
        history.round(0);
    }
}
