use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Represents a tool call request from the LLM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: String, name: String, arguments: Value) -> Self {
        Self {
            id,
            name,
            arguments,
        }
    }

    /// Parse a tool call from OpenAI response format.
    ///
    /// Empty argument strings are treated as `{}`; some backends send them
    /// for parameterless calls.
    pub fn from_openai_format(tool_call: &Value) -> Result<Self> {
        let id = tool_call
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let function = tool_call
            .get("function")
            .ok_or_else(|| AgentError::InvalidFunctionCall("Tool call missing function".to_string()))?;

        let name = function
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                AgentError::InvalidFunctionCall("Tool call missing function name".to_string())
            })?
            .to_string();

        let arguments = match function.get("arguments") {
            Some(Value::String(raw)) if raw.trim().is_empty() => Value::Object(Default::default()),
            Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|err| {
                AgentError::InvalidFunctionCall(format!(
                    "Failed to parse arguments for tool '{}': {}",
                    name, err
                ))
            })?,
            Some(object @ Value::Object(_)) => object.clone(),
            _ => Value::Object(Default::default()),
        };

        Ok(Self {
            id,
            name,
            arguments,
        })
    }

    /// Get a human-readable description
    pub fn describe(&self) -> String {
        format!("{}({})", self.name, self.arguments)
    }
}

/// Represents the output from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub tool_name: String,
    pub output: Value,
    pub is_error: bool,
    pub duration_ms: Option<u128>,
}

impl ToolOutput {
    /// Get the output as a string for message content
    pub fn as_string(&self) -> String {
        match &self.output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Tracks the execution of a tool call with timing information
#[derive(Debug)]
pub struct ToolExecution {
    pub tool_call: ToolCall,
    start_time: Instant,
}

impl ToolExecution {
    pub fn start(tool_call: ToolCall) -> Self {
        Self {
            tool_call,
            start_time: Instant::now(),
        }
    }

    /// Complete the execution from the tool's result
    pub fn complete(self, result: Result<Value>) -> ToolOutput {
        let duration = self.start_time.elapsed();
        let (output, is_error) = match result {
            Ok(output) => (output, false),
            Err(err) => (err.to_error_payload(), true),
        };
        ToolOutput {
            tool_call_id: self.tool_call.id,
            tool_name: self.tool_call.name,
            output,
            is_error,
            duration_ms: Some(duration.as_millis()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
