use crate::agent_strategies::{BidStrategyTrait, StrategyBalanced, StrategyBalancedBudget, StrategyTruthful};
use crate::history::History;
use crate::logger::Logger;

/// Static facts about an agent that a strategy may read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentProfile {
    pub agent_id: usize,
    /// Private value per click, fixed for the game
    pub value: f64,
    /// Total spend allowed over the game
    pub budget: f64,
}

/// Agent type for creating agents
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentType {
    TRUTHFUL,
    BALANCED,
    BALANCED_BUDGET,
}

impl AgentType {
    fn create_strategy(self) -> Box<dyn BidStrategyTrait> {
        match self {
            AgentType::TRUTHFUL => Box::new(StrategyTruthful),
            AgentType::BALANCED => Box::new(StrategyBalanced),
            AgentType::BALANCED_BUDGET => Box::new(StrategyBalancedBudget),
        }
    }
}

/// One participant of the game
pub struct Agent {
    pub agent_id: usize,
    pub agent_name: String,
    pub value: f64,
    pub budget: f64,
    pub strategy: Box<dyn BidStrategyTrait>,
}

impl Agent {
    pub fn profile(&self) -> AgentProfile {
        AgentProfile {
            agent_id: self.agent_id,
            value: self.value,
            budget: self.budget,
        }
    }

    pub fn initial_bid(&self, reserve: f64) -> f64 {
        self.strategy.initial_bid(&self.profile(), reserve)
    }

    /// Bid for round `t`; round 0 always uses the initial bid
    pub fn bid(&self, t: usize, history: &History, reserve: f64, logger: &mut Logger) -> f64 {
        if t == 0 {
            return self.initial_bid(reserve);
        }
        self.strategy.get_bid(&self.profile(), t, history, reserve, logger)
    }

    pub fn type_and_value_string(&self) -> String {
        format!("{} (value {:.2}, budget {:.2})", self.strategy.get_bidding_type(), self.value, self.budget)
    }
}

/// Container for agents with methods to create and manage them
pub struct Agents {
    pub agents: Vec<Agent>,
}

impl Agents {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
        }
    }

    /// Add an agent. Its agent_id is set to its index in the container.
    ///
    /// # Returns
    /// The agent_id of the just added agent
    pub fn add(&mut self, agent_name: String, agent_type: AgentType, value: f64, budget: f64) -> usize {
        if value.is_nan() || value < 0.0 {
            panic!("Invalid value {} for agent '{}'", value, agent_name);
        }
        if budget.is_nan() || budget < 0.0 {
            panic!("Invalid budget {} for agent '{}'", budget, agent_name);
        }
        let agent_id = self.agents.len();
        self.agents.push(Agent {
            agent_id,
            agent_name,
            value,
            budget,
            strategy: agent_type.create_strategy(),
        });
        agent_id
    }

    /// Add an agent with a custom strategy. The agent_id is overwritten with the container index.
    #[cfg(test)]
    pub fn add_advanced(&mut self, mut agent: Agent) -> usize {
        let agent_id = self.agents.len();
        agent.agent_id = agent_id;
        self.agents.push(agent);
        agent_id
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }
}

impl Default for Agents {
    fn default() -> Self {
        Self::new()
    }
}
