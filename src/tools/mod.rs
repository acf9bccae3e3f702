//! Tools module containing tool abstractions and built-in tools

pub mod function_factory;
pub mod search;
pub mod tool;

pub use function_factory::FunctionFactory;
pub use search::WebSearchTool;
pub use tool::{Tool, ToolRegistry};
