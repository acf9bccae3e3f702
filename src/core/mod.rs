pub mod agent;
pub mod memory;
pub mod steps;
pub mod task;
pub mod tool_call;

pub use crate::types::result::{TaskOutput, TokenUsage};
pub use agent::Agent;
pub use memory::AgentMemory;
pub use steps::AgentStep;
pub use task::Task;
pub use tool_call::{ToolCall, ToolExecution, ToolOutput};
