use std::error::Error;
use crate::history::History;
use crate::agents::Agents;
use crate::logger::{Logger, LogEvent};
use crate::{errln, logln};

/// Function type for scenario entry functions
pub type ScenarioFn = fn(scenario_name: &str, logger: &mut Logger) -> Result<(), Box<dyn Error>>;

/// Entry in the scenario catalog
#[derive(Clone)]
pub struct ScenarioEntry {
    pub short_name: &'static str,
    pub run: ScenarioFn,
}

// Create an inventory collection for scenario entries
inventory::collect!(ScenarioEntry);

/// Get all registered scenarios from the catalog, sorted by name
pub fn get_scenario_catalog() -> Vec<ScenarioEntry> {
    let mut catalog: Vec<ScenarioEntry> = inventory::iter::<ScenarioEntry>
        .into_iter()
        .cloned()
        .collect();
    catalog.sort_by_key(|entry| entry.short_name);
    catalog
}

/// Log a scenario check and remember its message if it failed
pub fn check(logger: &mut Logger, errors: &mut Vec<String>, passed: bool, msg: String) {
    if passed {
        logln!(logger, LogEvent::Scenario, "✓ {}", msg);
    } else {
        errln!(logger, LogEvent::Scenario, "{}", msg);
        errors.push(msg);
    }
}

/// Turn collected check failures into the scenario result
pub fn finish(scenario_name: &str, errors: Vec<String>) -> Result<(), Box<dyn Error>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("Scenario '{}' validation failed:\n{}", scenario_name, errors.join("\n")).into())
    }
}

/// Check that no agent was charged more than its budget
pub fn check_budgets(agents: &Agents, history: &History, label: &str, logger: &mut Logger, errors: &mut Vec<String>) {
    for (agent, &spent) in agents.agents.iter().zip(history.agents_spent()) {
        check(logger, errors, spent <= agent.budget + 1e-9, format!(
            "{}: agent {} ({}) spent within budget: {:.2} <= {:.2}",
            label, agent.agent_id, agent.agent_name, spent, agent.budget
        ));
    }
}

// Scenario modules
pub mod budget_pacing;
pub mod warmup;
