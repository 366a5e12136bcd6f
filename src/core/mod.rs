//! Core types: errors and agent state

mod error;
mod state;

pub use error::{AgentError, AgentResult, ToolError, ToolErrorKind};
pub use state::{AgentState, LoopState};
