/// A mixed field of truthful, balanced and budget-aware balanced bidders over one
/// traffic cycle, played once with tight budgets and once with loose ones.
///
/// Checks:
///
/// - No agent is ever charged past its budget
///
/// - Budget-aware bidders never pay more per click than their value, so their
///   utility stays non-negative however tight the budget is

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::Distribution;
use crate::agents::{AgentType, Agents};
use crate::game::{Game, GameConfig};
use crate::logger::{Logger, LogEvent};
use crate::scenarios::{check, check_budgets, finish};
use crate::utils::{self, get_seed};
use crate::logln;

// Register this scenario in the catalog
inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "budget_pacing",
    run,
});

const FIELD: [(&str, AgentType); 6] = [
    ("Truthful 0", AgentType::TRUTHFUL),
    ("Truthful 1", AgentType::TRUTHFUL),
    ("Balanced 0", AgentType::BALANCED),
    ("Balanced 1", AgentType::BALANCED),
    ("Budget 0", AgentType::BALANCED_BUDGET),
    ("Budget 1", AgentType::BALANCED_BUDGET),
];

/// Prepare a game where every agent gets the same budget.
/// Also returns the ids of the budget-aware agents.
pub fn prepare_game(budget: f64) -> (Game, Vec<usize>) {
    let config = GameConfig { budget, ..GameConfig::default() };
    let value_dist = utils::uniform_dist(25.0, 175.0);
    // Same values in both variants of an iteration
    let mut rng_values = StdRng::seed_from_u64(get_seed(1991));

    let mut agents = Agents::new();
    let mut budget_agents = Vec::new();
    for (name, agent_type) in FIELD {
        let value = value_dist.sample(&mut rng_values);
        let agent_id = agents.add(name.to_string(), agent_type, value, config.budget);
        if agent_type == AgentType::BALANCED_BUDGET {
            budget_agents.push(agent_id);
        }
    }
    (Game::new(agents, config), budget_agents)
}

pub fn run(scenario_name: &str, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let (game_tight, budget_agents) = prepare_game(20_000.0);
    let (history_tight, stats_tight) = game_tight.run_variant("Running with tight budgets", scenario_name, "tight", logger)?;

    let (game_loose, _) = prepare_game(500_000.0);
    let (history_loose, stats_loose) = game_loose.run_variant("Running with loose budgets", scenario_name, "loose", logger)?;

    logln!(logger, LogEvent::Scenario, "");

    let mut errors = Vec::new();

    check_budgets(&game_tight.agents, &history_tight, "Tight", logger, &mut errors);
    check_budgets(&game_loose.agents, &history_loose, "Loose", logger, &mut errors);

    for (label, stats) in [("Tight", &stats_tight), ("Loose", &stats_loose)] {
        for &agent_id in &budget_agents {
            let stat = &stats.agent_stats[agent_id];
            check(logger, &mut errors, stat.utility >= -1e-9, format!(
                "{}: budget agent {} has non-negative utility: {:.2}",
                label, agent_id, stat.utility
            ));
        }
    }

    logln!(logger, LogEvent::Scenario, "Revenue tight/loose: {:.2} / {:.2}",
        stats_tight.overall_stat.total_revenue, stats_loose.overall_stat.total_revenue);

    finish(scenario_name, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_game_is_reproducible() {
        let (game_a, budget_a) = prepare_game(100.0);
        let (game_b, _) = prepare_game(200.0);
        assert_eq!(budget_a, vec![4, 5]);
        for (a, b) in game_a.agents.agents.iter().zip(game_b.agents.agents.iter()) {
            assert_eq!(a.value, b.value);
            assert!(a.value >= 25.0 && a.value < 175.0);
        }
        assert_eq!(game_a.agents.agents[0].budget, 100.0);
    }
}
