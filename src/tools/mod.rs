//! Sandboxed tools for the agent
//!
//! This module provides:
//! - `get_files_info`, `get_file_content`, `write_file`, `run_python_file` handlers
//! - `ToolResult` - Result type for tool execution
//! - `Dispatcher` - Routes model tool calls to handlers and wraps the results

mod dispatcher;
mod tool;

pub mod list_tool;
pub mod read_tool;
pub mod run_tool;
pub mod write_tool;

pub use dispatcher::{Dispatcher, ToolDispatch};
pub use list_tool::get_files_info;
pub use read_tool::get_file_content;
pub use run_tool::run_python_file;
pub use tool::{ToolCallRequest, ToolName, ToolResult};
pub use write_tool::write_file;

use crate::llm::FunctionDeclaration;

/// Declarations for every tool, in a stable order
pub fn declarations() -> Vec<FunctionDeclaration> {
    ToolName::ALL.iter().map(|tool| tool.declaration()).collect()
}
