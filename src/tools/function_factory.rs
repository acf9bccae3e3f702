use super::{tool::ToolRegistry, Tool};
use crate::{AgentError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Factory for creating and managing function/tool execution
#[derive(Debug, Default, Clone)]
pub struct FunctionFactory {
    registry: ToolRegistry,
}

impl FunctionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        self.registry.register(tool);
    }

    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        self.registry.register_shared(tool);
    }

    /// Execute a function call by name
    pub async fn execute_function(&self, function_name: &str, parameters: Value) -> Result<Value> {
        let tool = self
            .registry
            .get(function_name)
            .ok_or_else(|| AgentError::ToolNotFound(function_name.to_string()))?;

        tool.execute(parameters).await
    }

    /// Get all available tools for OpenAI function calling
    pub fn get_openai_tools(&self) -> Vec<Value> {
        self.registry.to_openai_tools()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.registry.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
