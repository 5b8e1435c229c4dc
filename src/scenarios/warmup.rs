/// A reserve price high enough that at most two agents clear it in any round.
///
/// The market never settles more than two slot payments, so the budget-aware
/// bidder has no price history to react to and must keep bidding reserve + 1.

use crate::agents::{AgentType, Agents};
use crate::game::{Game, GameConfig};
use crate::history::History;
use crate::logger::{Logger, LogEvent};
use crate::scenarios::{check, check_budgets, finish};
use crate::logln;

// Register this scenario in the catalog
inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "warmup",
    run,
});

const RESERVE: f64 = 35.0;

fn prepare_game() -> Game {
    let config = GameConfig { reserve: RESERVE, ..GameConfig::default() };
    let mut agents = Agents::new();
    for (i, value) in [40.0, 30.0, 20.0, 10.0].into_iter().enumerate() {
        agents.add(format!("Truthful {}", i), AgentType::TRUTHFUL, value, config.budget);
    }
    agents.add("Budget".to_string(), AgentType::BALANCED_BUDGET, 60.0, config.budget);
    Game::new(agents, config)
}

/// Rounds in which the agent should have bid reserve + 1 but did not.
/// Those are rounds after a round that settled two or fewer slot payments.
pub fn warmup_violations(history: &History, agent_id: usize, reserve: f64) -> Vec<usize> {
    (1..history.num_rounds())
        .filter(|&t| history.round(t - 1).slot_payments.len() <= 2)
        .filter(|&t| history.round(t).bid_of(agent_id) != Some(reserve + 1.0))
        .collect()
}

pub fn run(scenario_name: &str, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let game = prepare_game();
    let (history, _stats) = game.run_variant("Running with a high reserve", scenario_name, "high_reserve", logger)?;
    let budget_agent = game.agents.len() - 1;

    logln!(logger, LogEvent::Scenario, "");

    let mut errors = Vec::new();

    let thin_rounds = (0..history.num_rounds())
        .filter(|&t| history.round(t).slot_payments.len() <= 2)
        .count();
    check(logger, &mut errors, thin_rounds == history.num_rounds(), format!(
        "Every round settled at most two payments: {} of {} rounds",
        thin_rounds, history.num_rounds()
    ));

    let violations = warmup_violations(&history, budget_agent, RESERVE);
    check(logger, &mut errors, violations.is_empty(), format!(
        "Budget agent bid reserve + 1 ({:.2}) after every thin round, violations in rounds {:?}",
        RESERVE + 1.0, violations
    ));

    check_budgets(&game.agents, &history, "High reserve", logger, &mut errors);

    finish(scenario_name, errors)
}
