pub mod execution;
pub mod openai_client;
pub mod prompts;

pub use execution::Executor;
pub use openai_client::{ChatCompletionRequest, CompletionBackend, OpenAIClient};
