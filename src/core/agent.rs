use crate::{
    config::ModelTier,
    tools::{FunctionFactory, Tool},
};
use std::sync::Arc;

const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

/// A persona the executor runs tasks as: role, goal and backstory become the
/// system prompt, and `tier` picks the model.
#[derive(Debug, Clone)]
pub struct Agent {
    role: String,
    goal: String,
    backstory: String,
    tier: ModelTier,
    function_factory: FunctionFactory,
    max_tool_rounds: usize,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tier: ModelTier::Accurate,
            function_factory: FunctionFactory::new(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.function_factory.register_tool(tool);
        self
    }

    pub fn with_shared_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.function_factory.register_shared(tool);
        self
    }

    /// Tool-call rounds allowed per attempt before the model must answer.
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn tier(&self) -> ModelTier {
        self.tier
    }

    pub fn function_factory(&self) -> &FunctionFactory {
        &self.function_factory
    }

    pub fn max_tool_rounds(&self) -> usize {
        self.max_tool_rounds
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\n\nYour goal: {}",
            self.role, self.backstory, self.goal
        )
    }
}
