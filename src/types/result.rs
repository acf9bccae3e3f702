use crate::core::steps::AgentStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Result of running one task on an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Final model text, returned to the caller unchanged
    pub raw: String,
    /// Validated JSON block when the task had a guardrail and it passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Whether the guardrail accepted the final output (always true without one)
    pub accepted: bool,
    /// Model invocations that produced a candidate answer
    pub attempts: usize,
    /// All steps taken during execution
    pub steps: Vec<AgentStep>,
    /// Summed token usage (if the backend reports it)
    pub tokens: Option<TokenUsage>,
    pub duration: Duration,
}

/// Token usage information from the API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn from_response(response: &Value) -> Option<Self> {
        let usage = response.get("usage")?;
        Some(Self {
            prompt_tokens: usage.get("prompt_tokens")?.as_u64()? as u32,
            completion_tokens: usage.get("completion_tokens")?.as_u64()? as u32,
            total_tokens: usage.get("total_tokens")?.as_u64()? as u32,
        })
    }

    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

impl TaskOutput {
    /// Generate a human-readable replay of the execution
    pub fn replay(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Task Execution Trace ===".to_string());
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Attempts: {}", self.attempts));
        lines.push(format!("Accepted: {}", self.accepted));

        if let Some(tokens) = &self.tokens {
            lines.push(format!(
                "Tokens: {} prompt + {} completion = {} total",
                tokens.prompt_tokens, tokens.completion_tokens, tokens.total_tokens
            ));
        }

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        lines.push(String::new());
        lines.push("--- Final Output ---".to_string());
        lines.push(self.raw.clone());

        lines.join("\n")
    }

    /// Number of tool calls made across all attempts
    pub fn action_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Action { .. }))
            .count()
    }

    /// Corrective messages sent back to the model
    pub fn corrections(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                AgentStep::Correction { feedback } => Some(feedback.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_output() -> TaskOutput {
        TaskOutput {
            raw: "{\"action\": \"remove_items\"}".to_string(),
            payload: None,
            accepted: false,
            attempts: 2,
            steps: vec![
                AgentStep::Task {
                    content: "remove breakfast".to_string(),
                },
                AgentStep::Output {
                    content: "not json".to_string(),
                },
                AgentStep::Correction {
                    feedback: "No JSON object found".to_string(),
                },
                AgentStep::Output {
                    content: "{\"action\": \"remove_items\"}".to_string(),
                },
            ],
            tokens: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            duration: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_replay_format() {
        let replay = sample_output().replay();
        assert!(replay.contains("=== Task Execution Trace ==="));
        assert!(replay.contains("Attempts: 2"));
        assert!(replay.contains("Tokens: 10 prompt + 5 completion = 15 total"));
        assert!(replay.contains("--- Final Output ---"));
    }

    #[test]
    fn test_corrections_tracked() {
        let output = sample_output();
        assert_eq!(output.corrections(), vec!["No JSON object found"]);
        assert_eq!(output.action_count(), 0);
    }

    #[test]
    fn test_token_usage_from_response() {
        let response = serde_json::json!({
            "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
        });
        let mut total = TokenUsage::default();
        total.add(&TokenUsage::from_response(&response).unwrap());
        total.add(&TokenUsage::from_response(&response).unwrap());
        assert_eq!(total.total_tokens, 14);
        assert!(TokenUsage::from_response(&serde_json::json!({})).is_none());
    }
}
