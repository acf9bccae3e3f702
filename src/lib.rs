//! wego-agent-rs: intent-routed trip planning over an OpenAI-compatible LLM
//!
//! A chat request is classified into one of five intents, dispatched to a
//! persona prompt on the matching model tier, and the model's JSON action is
//! checked by a guardrail that feeds corrective prompts back on failure.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wego_agent_rs::{Config, SuggestRequest, TripContext, TripPlanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let planner = TripPlanner::from_config(&config)?;
//!
//!     let request = SuggestRequest::new("add a sushi dinner on day 2", TripContext::default());
//!     let reply = planner.handle(&request).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

extern crate self as wego_agent_rs;

pub mod config;
pub mod core;
pub mod error;
pub mod routing;
pub mod schemas;
pub mod server;
pub mod services;
pub mod tools;
pub mod types;

pub use config::{Config, ModelProfile, ModelRoster, ModelTier};
pub use core::{Agent, AgentMemory, AgentStep, Task, ToolCall, ToolExecution, ToolOutput};
pub use error::{AgentError, Result};
pub use routing::{IntentClassifier, TripPlanner};
pub use schemas::{ActionSchema, Guardrail, GuardrailVerdict, SchemaHandle};
pub use services::{CompletionBackend, Executor, OpenAIClient};
pub use tools::{FunctionFactory, Tool, WebSearchTool};
pub use types::{
    ActionPayload, ChatMessage, Intent, SuggestRequest, SuggestResponse, TaskOutput, TokenUsage,
    TripContext,
};
pub use wego_macros::action_schema;

#[cfg(feature = "cli")]
pub mod cli;
