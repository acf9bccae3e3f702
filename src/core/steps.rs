use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents a single step while an agent works on a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// Task prompt handed to the agent
    Task { content: String },
    /// The model requested a tool call
    Action {
        tool_name: String,
        tool_call_id: String,
        arguments: Value,
    },
    /// Result of a tool execution
    Observation {
        tool_call_id: String,
        result: String,
        is_error: bool,
    },
    /// Text answer produced by the model
    Output { content: String },
    /// Guardrail feedback sent back as a new user turn
    Correction { feedback: String },
}

impl AgentStep {
    /// Convert step to OpenAI message format
    pub fn to_message(&self) -> Value {
        match self {
            AgentStep::Task { content } => {
                serde_json::json!({
                    "role": "user",
                    "content": content
                })
            }
            AgentStep::Action {
                tool_name,
                tool_call_id,
                arguments,
            } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": tool_call_id,
                        "type": "function",
                        "function": {
                            "name": tool_name,
                            "arguments": arguments.to_string()
                        }
                    }]
                })
            }
            AgentStep::Observation {
                tool_call_id,
                result,
                ..
            } => {
                serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": result
                })
            }
            AgentStep::Output { content } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": content
                })
            }
            AgentStep::Correction { feedback } => {
                serde_json::json!({
                    "role": "user",
                    "content": feedback
                })
            }
        }
    }

    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Task { content } => format!("🧭 Task: {}", preview(content)),
            AgentStep::Action {
                tool_name,
                arguments,
                ..
            } => format!("🔧 Action: {}({})", tool_name, arguments),
            AgentStep::Observation {
                result, is_error, ..
            } => {
                if *is_error {
                    format!("❌ Error: {}", preview(result))
                } else {
                    format!("👁 Observation: {}", preview(result))
                }
            }
            AgentStep::Output { content } => format!("💬 Output: {}", preview(content)),
            AgentStep::Correction { feedback } => format!("🛑 Correction: {}", feedback),
        }
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 160;
    let flat = text.replace('\n', " ");
    match flat.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}…", &flat[..idx]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_is_user_turn() {
        let step = AgentStep::Correction {
            feedback: "Add the day field".to_string(),
        };
        let message = step.to_message();
        assert_eq!(message["role"], "user");
        assert_eq!(message["content"], "Add the day field");
    }

    #[test]
    fn test_action_serializes_arguments() {
        let step = AgentStep::Action {
            tool_name: "web_search".to_string(),
            tool_call_id: "call_1".to_string(),
            arguments: serde_json::json!({"query": "dinner"}),
        };
        let message = step.to_message();
        assert_eq!(
            message["tool_calls"][0]["function"]["arguments"],
            "{\"query\":\"dinner\"}"
        );
    }

    #[test]
    fn test_describe_truncates_long_text() {
        let step = AgentStep::Output {
            content: "x".repeat(500),
        };
        let described = step.describe();
        assert!(described.ends_with('…'));
        assert!(described.chars().count() < 200);
    }
}
