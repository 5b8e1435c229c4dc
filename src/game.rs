/// This file contains the Game struct, which plays one full repeated GSP auction
/// (one auction per round over the traffic cycle) and collects the results.
///
/// Each round:
/// - clicks per slot come from the click model for that round
/// - every agent bids, reading only the history settled so far
/// - agents that exhausted their budget are left out of the auction
/// - winners are charged GSP prices, capped at what is left of their budget
/// - the settled round is appended to the history

use crate::agents::Agents;
use crate::clicks::{forecast_clicks_rounded, forecast_slot_count, PERIOD_ROUNDS};
use crate::gsp::Gsp;
use crate::history::{AgentBid, History, RoundRecord};
use crate::logger::{Logger, LogEvent, FileReceiver, sanitize_filename};
use crate::utils::{TOTAL_SIMULATION_RUNS, VERBOSE_AUCTION};
use crate::{errln, logln, warnln};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

/// Parameters of a game
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub num_rounds: usize,
    pub reserve: f64,
    /// Budget given to agents that scenarios create without an explicit one
    pub budget: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_rounds: PERIOD_ROUNDS,
            reserve: 0.0,
            budget: 60_000.0,
        }
    }
}

/// Agents plus the rules they play under
pub struct Game {
    pub agents: Agents,
    pub config: GameConfig,
}

impl Game {
    pub fn new(agents: Agents, config: GameConfig) -> Self {
        Self { agents, config }
    }

    pub fn printout(&self, logger: &mut Logger) {
        logln!(logger, LogEvent::Game, "Initialized {} agents, {} rounds, reserve {:.2}",
            self.agents.len(), self.config.num_rounds, self.config.reserve);
        for agent in &self.agents.agents {
            logln!(logger, LogEvent::Game, "  Agent {} ({}) - {}", agent.agent_id, agent.agent_name, agent.type_and_value_string());
        }
    }

    /// Play all rounds and return the resulting history
    pub fn run(&self, logger: &mut Logger) -> History {
        TOTAL_SIMULATION_RUNS.fetch_add(1, Ordering::Relaxed);

        let n_agents = self.agents.len();
        let num_slots = forecast_slot_count(n_agents);
        let reserve = self.config.reserve;
        let mut history = History::new(n_agents);

        for t in 0..self.config.num_rounds {
            let clicks = forecast_clicks_rounded(t, num_slots);

            let mut bids = Vec::with_capacity(n_agents);
            for agent in &self.agents.agents {
                let bid = agent.bid(t, &history, reserve, logger);
                if bid.is_nan() || bid < 0.0 {
                    errln!(logger, LogEvent::Round, "Round {}: invalid bid {:.4} from agent_id: {}, skipping", t, bid, agent.agent_id);
                    continue;
                }
                bids.push(AgentBid { agent_id: agent.agent_id, bid });
            }

            let eligible: Vec<AgentBid> = bids.iter()
                .filter(|b| history.spent_by(b.agent_id) < self.agents.agents[b.agent_id].budget)
                .copied()
                .collect();

            let mut outcome = Gsp::compute(&clicks, reserve, &eligible);

            for (slot, &agent_id) in outcome.occupants.iter().enumerate() {
                let remaining = (self.agents.agents[agent_id].budget - history.spent_by(agent_id)).max(0.0);
                if outcome.slot_payments[slot] > remaining {
                    warnln!(logger, LogEvent::Round, "Round {}: agent_id {} owes {:.2} in slot {} but has {:.2} left, charge capped",
                        t, agent_id, outcome.slot_payments[slot], slot, remaining);
                    outcome.slot_payments[slot] = remaining;
                }
            }

            if VERBOSE_AUCTION.load(Ordering::Relaxed) {
                log_auction_csv(t, &clicks, &bids, &outcome.occupants, &outcome.per_click_prices, logger);
            }

            let record = RoundRecord::new(t, bids, clicks, outcome);
            log_round(&record, logger);
            history.add_round(record);
        }

        history
    }

    /// Play the game as one variant of a scenario.
    /// Round events go to log/<scenario>/rounds-<variant>.log and game events to
    /// log/<scenario>/variant-<variant>.log for the duration of the run.
    pub fn run_variant(
        &self,
        variant_description: &str,
        scenario_name: &str,
        variant_name: &str,
        logger: &mut Logger,
    ) -> Result<(History, GameStat), Box<dyn std::error::Error>> {
        let scenario_dir = sanitize_filename(scenario_name);
        let variant_file = sanitize_filename(variant_name);
        let rounds_receiver_id = logger.add_receiver(FileReceiver::new(&PathBuf::from(format!("log/{}/rounds-{}.log", scenario_dir, variant_file)), vec![LogEvent::Round])?);
        let variant_receiver_id = logger.add_receiver(FileReceiver::new(&PathBuf::from(format!("log/{}/variant-{}.log", scenario_dir, variant_file)), vec![LogEvent::Game])?);

        logln!(logger, LogEvent::Game, "\n=== {} ===", variant_description);
        self.printout(logger);

        let history = self.run(logger);
        let stat = GameStat::new(&self.agents, &history);
        stat.printout(&self.agents, logger);

        logger.remove_receiver(rounds_receiver_id);
        logger.remove_receiver(variant_receiver_id);
        Ok((history, stat))
    }
}

fn log_round(record: &RoundRecord, logger: &mut Logger) {
    let bids: Vec<String> = record.bids.iter().map(|b| format!("{}:{:.2}", b.agent_id, b.bid)).collect();
    logln!(logger, LogEvent::Round, "Round {:2}  clicks {:?}  bids [{}]", record.round, record.clicks, bids.join(" "));
    for (slot, &agent_id) in record.occupants.iter().enumerate() {
        logln!(logger, LogEvent::Round, "  slot {}: agent {} pays {:.2}/click, {:.2} total",
            slot, agent_id, record.per_click_prices[slot], record.slot_payments[slot]);
    }
}

/// round,slot clicks...,per agent bid and slot (empty when not placed)
fn log_auction_csv(t: usize, clicks: &[u32], bids: &[AgentBid], occupants: &[usize], prices: &[f64], logger: &mut Logger) {
    let mut csv_fields = vec![format!("{}", t)];
    for (slot, c) in clicks.iter().enumerate() {
        csv_fields.push(format!("{}", c));
        csv_fields.push(prices.get(slot).map_or(String::new(), |p| format!("{:.4}", p)));
    }
    for bid in bids {
        csv_fields.push(format!("{:.4}", bid.bid));
        let slot = occupants.iter().position(|&id| id == bid.agent_id);
        csv_fields.push(slot.map_or(String::new(), |s| format!("{}", s)));
    }
    logln!(logger, LogEvent::Auction, "{}", csv_fields.join(","));
}

/// Statistics for a single agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStat {
    pub clicks: u64,
    pub rounds_placed: usize,
    pub total_spent: f64,
    /// clicks * value per click
    pub total_value: f64,
    /// total_value - total_spent
    pub utility: f64,
}

/// Overall statistics for the game
#[derive(Debug, Clone, PartialEq)]
pub struct OverallStat {
    pub total_clicks: u64,
    pub total_revenue: f64,
    pub total_value: f64,
}

/// Complete game statistics
pub struct GameStat {
    pub agent_stats: Vec<AgentStat>,
    pub overall_stat: OverallStat,
}

impl GameStat {
    pub fn new(agents: &Agents, history: &History) -> Self {
        let mut agent_stats: Vec<AgentStat> = (0..agents.len())
            .map(|_| AgentStat {
                clicks: 0,
                rounds_placed: 0,
                total_spent: 0.0,
                total_value: 0.0,
                utility: 0.0,
            })
            .collect();

        for record in history.rounds() {
            for (slot, &agent_id) in record.occupants.iter().enumerate() {
                let stat = &mut agent_stats[agent_id];
                let clicks = record.clicks[slot];
                stat.clicks += clicks as u64;
                stat.rounds_placed += 1;
                stat.total_spent += record.slot_payments[slot];
                stat.total_value += clicks as f64 * agents.agents[agent_id].value;
            }
        }
        for stat in &mut agent_stats {
            stat.utility = stat.total_value - stat.total_spent;
        }

        let overall_stat = OverallStat {
            total_clicks: agent_stats.iter().map(|s| s.clicks).sum(),
            total_revenue: agent_stats.iter().map(|s| s.total_spent).sum(),
            total_value: agent_stats.iter().map(|s| s.total_value).sum(),
        };

        Self { agent_stats, overall_stat }
    }

    pub fn printout_agents(&self, agents: &Agents, logger: &mut Logger, event: LogEvent) {
        for (agent, stat) in agents.agents.iter().zip(self.agent_stats.iter()) {
            logln!(logger, event, "\nAgent {} ({}) - {}", agent.agent_id, agent.agent_name, agent.type_and_value_string());
            logln!(logger, event, "  Clicks: {} in {} rounds placed", stat.clicks, stat.rounds_placed);
            let budget_used = if agent.budget > 0.0 { stat.total_spent / agent.budget * 100.0 } else { 0.0 };
            logln!(logger, event, "  Spent: {:.2} ({:.1}% of budget)", stat.total_spent, budget_used);
            logln!(logger, event, "  Value: {:.2}, utility: {:.2}", stat.total_value, stat.utility);
        }
    }

    pub fn printout(&self, agents: &Agents, logger: &mut Logger) {
        logln!(logger, LogEvent::Game, "\n=== Agent Statistics ===");
        self.printout_agents(agents, logger, LogEvent::Game);
        logln!(logger, LogEvent::Game, "\n=== Overall Statistics ===");
        logln!(logger, LogEvent::Game, "Clicks sold: {}", self.overall_stat.total_clicks);
        logln!(logger, LogEvent::Game, "Revenue: {:.2}", self.overall_stat.total_revenue);
        logln!(logger, LogEvent::Game, "Value delivered: {:.2}", self.overall_stat.total_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentType;
    use crate::logger::MemoryReceiver;

    fn truthful_agents(values: &[f64], budget: f64) -> Agents {
        let mut agents = Agents::new();
        for (i, &value) in values.iter().enumerate() {
            agents.add(format!("Truthful {}", i), AgentType::TRUTHFUL, value, budget);
        }
        agents
    }

    #[test]
    fn test_first_round_allocation() {
        let game = Game::new(truthful_agents(&[10.0, 8.0, 6.0], 1e9), GameConfig { num_rounds: 1, reserve: 0.0, budget: 1e9 });
        let mut logger = Logger::new();
        let history = game.run(&mut logger);

        let round = history.round(0);
        assert_eq!(round.clicks, vec![80, 60]);
        assert_eq!(round.occupants, vec![0, 1]);
        assert_eq!(round.per_click_prices, vec![8.0, 6.0]);
        assert_eq!(round.slot_payments, vec![640.0, 360.0]);
        assert_eq!(history.spent_by(0), 640.0);
        assert_eq!(history.spent_by(2), 0.0);
    }

    #[test]
    fn test_spend_never_exceeds_budget() {
        let mut agents = truthful_agents(&[10.0, 8.0], 1500.0);
        agents.add("Budget".to_string(), AgentType::BALANCED_BUDGET, 12.0, 2500.0);
        agents.add("Balanced".to_string(), AgentType::BALANCED, 9.0, 1200.0);
        let game = Game::new(agents, GameConfig { num_rounds: 48, reserve: 0.5, budget: 0.0 });
        let mut logger = Logger::new();
        let history = game.run(&mut logger);

        for agent in &game.agents.agents {
            assert!(history.spent_by(agent.agent_id) <= agent.budget + 1e-9,
                "agent {} spent {} of {}", agent.agent_id, history.spent_by(agent.agent_id), agent.budget);
        }
    }

    #[test]
    fn test_exhausted_agent_is_left_out() {
        // agent 0 can afford exactly one round in the top slot
        let game = Game::new(truthful_agents(&[10.0, 8.0, 6.0], 640.0), GameConfig { num_rounds: 2, reserve: 0.0, budget: 0.0 });
        let mut logger = Logger::new();
        let history = game.run(&mut logger);

        assert_eq!(history.spent_by(0), 640.0);
        assert!(!history.round(1).occupants.contains(&0));
        // the bid is still on record
        assert_eq!(history.round(1).bid_of(0), Some(10.0));
    }

    #[test]
    fn test_charge_capped_with_warning() {
        let game = Game::new(truthful_agents(&[10.0, 8.0, 6.0], 100.0), GameConfig { num_rounds: 1, reserve: 0.0, budget: 0.0 });
        let mut logger = Logger::new();
        let (receiver, buffer) = MemoryReceiver::new(vec![LogEvent::Game]);
        logger.add_receiver(receiver);
        let history = game.run(&mut logger);

        assert_eq!(history.round(0).slot_payments, vec![100.0, 100.0]);
        assert!(buffer.borrow().contains("charge capped"));
    }

    #[test]
    fn test_game_stat() {
        let agents = truthful_agents(&[10.0, 8.0, 6.0], 1e9);
        let game = Game::new(agents, GameConfig { num_rounds: 1, reserve: 0.0, budget: 1e9 });
        let mut logger = Logger::new();
        let history = game.run(&mut logger);
        let stat = GameStat::new(&game.agents, &history);

        assert_eq!(stat.agent_stats[0], AgentStat { clicks: 80, rounds_placed: 1, total_spent: 640.0, total_value: 800.0, utility: 160.0 });
        assert_eq!(stat.agent_stats[1], AgentStat { clicks: 60, rounds_placed: 1, total_spent: 360.0, total_value: 480.0, utility: 120.0 });
        assert_eq!(stat.agent_stats[2].clicks, 0);
        assert_eq!(stat.overall_stat.total_clicks, 140);
        assert_eq!(stat.overall_stat.total_revenue, 1000.0);
    }
}
