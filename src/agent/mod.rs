pub mod agent_loop;
pub mod config;
pub mod system_prompt;

pub use agent_loop::{validate_tool_response, Agent, AgentOutcome};
pub use config::{AgentConfig, DEFAULT_MAX_STEPS};
pub use system_prompt::DEFAULT_SYSTEM_PROMPT;
