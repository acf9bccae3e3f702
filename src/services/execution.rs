use super::openai_client::{ChatCompletionRequest, CompletionBackend};
use crate::{
    config::{ModelRoster, ModelTier},
    core::{
        agent::Agent, memory::AgentMemory, steps::AgentStep, task::Task, tool_call::ToolCall,
        tool_call::ToolExecution,
    },
    error::{AgentError, Result},
    schemas::{GuardrailVerdict, MAX_GUARDRAIL_ATTEMPTS},
    types::result::{TaskOutput, TokenUsage},
};
use serde_json::{json, Value};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Runs tasks on agents against a completion backend.
#[derive(Debug, Clone)]
pub struct Executor {
    backend: Arc<dyn CompletionBackend>,
    models: ModelRoster,
    timeout: Duration,
}

impl Executor {
    pub fn new(backend: Arc<dyn CompletionBackend>, models: ModelRoster) -> Self {
        Self {
            backend,
            models,
            timeout: Duration::from_secs(120),
        }
    }

    /// Upper bound on a single backend call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn models(&self) -> &ModelRoster {
        &self.models
    }

    /// One tool-less completion on the given tier; returns the assistant text.
    pub async fn complete(&self, tier: ModelTier, messages: Vec<Value>) -> Result<String> {
        let profile = self.models.profile(tier);
        let body = ChatCompletionRequest::new(profile.model.clone(), messages)
            .with_max_tokens(Some(profile.max_tokens))
            .into_value();

        let response = self.call_backend(&body).await?;
        let message = assistant_message(&response)?;
        Ok(message_content(&message))
    }

    /// Run `task` as `agent`.
    ///
    /// With a guardrail the model is invoked at most
    /// [`MAX_GUARDRAIL_ATTEMPTS`] times. Each rejected answer is followed by
    /// the guardrail's corrective message as a new user turn. When every
    /// attempt is rejected the last answer is returned with
    /// `accepted == false`. Backend errors end the task immediately.
    pub async fn execute(&self, agent: &Agent, task: &Task) -> Result<TaskOutput> {
        let start_time = Instant::now();
        let mut memory = AgentMemory::new(Some(agent.system_prompt()));
        memory.add_step(AgentStep::Task {
            content: task.prompt(),
        });

        let max_attempts = if task.guardrail().is_some() {
            MAX_GUARDRAIL_ATTEMPTS
        } else {
            1
        };
        let mut tokens: Option<TokenUsage> = None;
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(target: "wego::steps", role = agent.role(), attempt = attempts, "running task");

            let raw = self.run_attempt(agent, &mut memory, &mut tokens).await?;
            memory.add_step(AgentStep::Output {
                content: raw.clone(),
            });

            let Some(guardrail) = task.guardrail() else {
                return Ok(finish(raw, None, true, attempts, memory, tokens, start_time));
            };

            match guardrail.check(&raw) {
                GuardrailVerdict::Accepted(payload) => {
                    info!(
                        target: "wego::guardrail",
                        action = guardrail.action(),
                        attempts,
                        "output accepted"
                    );
                    return Ok(finish(
                        raw,
                        Some(payload),
                        true,
                        attempts,
                        memory,
                        tokens,
                        start_time,
                    ));
                }
                GuardrailVerdict::Rejected(feedback) => {
                    if attempts >= max_attempts {
                        warn!(
                            target: "wego::guardrail",
                            action = guardrail.action(),
                            attempts,
                            "guardrail retries exhausted, returning last output: {}",
                            feedback
                        );
                        return Ok(finish(raw, None, false, attempts, memory, tokens, start_time));
                    }
                    memory.add_step(AgentStep::Correction { feedback });
                }
            }
        }
    }

    /// One answer from the model, following any tool calls it makes first.
    /// The last allowed round is sent without tools.
    async fn run_attempt(
        &self,
        agent: &Agent,
        memory: &mut AgentMemory,
        tokens: &mut Option<TokenUsage>,
    ) -> Result<String> {
        let profile = self.models.profile(agent.tier());
        let tools = agent.function_factory().get_openai_tools();
        let max_rounds = agent.max_tool_rounds().max(1);
        let mut round = 0;

        loop {
            round += 1;
            let offer_tools = !tools.is_empty() && round < max_rounds;

            let mut chat_request =
                ChatCompletionRequest::new(profile.model.clone(), memory.as_messages())
                    .with_max_tokens(Some(profile.max_tokens));

            if offer_tools {
                chat_request = chat_request
                    .with_tools(tools.clone())
                    .with_tool_choice(json!("auto"));
            }

            let response = self.call_backend(&chat_request.into_value()).await?;

            if let Some(usage) = TokenUsage::from_response(&response) {
                tokens.get_or_insert_with(TokenUsage::default).add(&usage);
            }

            let message = assistant_message(&response)?;

            let tool_calls = message
                .get("tool_calls")
                .and_then(Value::as_array)
                .filter(|calls| !calls.is_empty());

            match tool_calls {
                Some(calls) if offer_tools => {
                    for call in calls {
                        self.run_tool_call(agent, memory, call).await;
                    }
                }
                _ => return Ok(message_content(&message)),
            }
        }
    }

    async fn run_tool_call(&self, agent: &Agent, memory: &mut AgentMemory, raw_call: &Value) {
        let tool_call = match ToolCall::from_openai_format(raw_call) {
            Ok(call) => call,
            Err(error) => {
                let id = raw_call
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let name = raw_call
                    .pointer("/function/name")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                memory.add_step(AgentStep::Action {
                    tool_name: name,
                    tool_call_id: id.clone(),
                    arguments: Value::Null,
                });
                memory.add_step(AgentStep::Observation {
                    tool_call_id: id,
                    result: error.to_error_payload().to_string(),
                    is_error: true,
                });
                return;
            }
        };

        memory.add_step(AgentStep::Action {
            tool_name: tool_call.name.clone(),
            tool_call_id: tool_call.id.clone(),
            arguments: tool_call.arguments.clone(),
        });

        let execution = ToolExecution::start(tool_call.clone());
        let result = agent
            .function_factory()
            .execute_function(&tool_call.name, tool_call.arguments)
            .await;
        let output = execution.complete(result);

        debug!(
            target: "wego::steps",
            tool = %output.tool_name,
            duration_ms = ?output.duration_ms,
            is_error = output.is_error,
            "tool call finished"
        );

        memory.add_step(AgentStep::Observation {
            tool_call_id: output.tool_call_id.clone(),
            result: output.as_string(),
            is_error: output.is_error,
        });
    }

    async fn call_backend(&self, body: &Value) -> Result<Value> {
        timeout(self.timeout, self.backend.chat_completion(body))
            .await
            .map_err(|_| AgentError::Timeout("LLM API call timed out".to_string()))?
    }
}

fn assistant_message(response: &Value) -> Result<Value> {
    let choices = response
        .get("choices")
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            AgentError::Llm("Missing 'choices' array in completion response".to_string())
        })?;

    let first_choice = choices
        .first()
        .ok_or_else(|| AgentError::Llm("Completion response contained no choices".to_string()))?;

    first_choice
        .get("message")
        .cloned()
        .ok_or_else(|| AgentError::Llm("Completion response missing assistant message".to_string()))
}

fn message_content(message: &Value) -> String {
    message
        .get("content")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

fn finish(
    raw: String,
    payload: Option<Value>,
    accepted: bool,
    attempts: usize,
    memory: AgentMemory,
    tokens: Option<TokenUsage>,
    start_time: Instant,
) -> TaskOutput {
    TaskOutput {
        raw,
        payload,
        accepted,
        attempts,
        steps: memory.into_steps(),
        tokens,
        duration: start_time.elapsed(),
    }
}
