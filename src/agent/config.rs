//! Agent Configuration
//!
//! Configuration options for the agent loop.

use super::system_prompt::DEFAULT_SYSTEM_PROMPT;

/// Model requests allowed per run
pub const DEFAULT_MAX_STEPS: usize = 20;

/// Configuration for an Agent
///
/// ```ignore
/// let config = AgentConfig::new("You are a helpful assistant")
///     .with_max_steps(20)
///     .with_verbose(true);
/// ```
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System instruction sent with every model request
    pub system_prompt: String,

    /// Maximum number of model requests per run
    pub max_steps: usize,

    /// Print call arguments and tool responses, not just call names
    pub verbose: bool,
}

impl AgentConfig {
    /// Create a new agent configuration with a system prompt
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            max_steps: DEFAULT_MAX_STEPS,
            verbose: false,
        }
    }

    /// Set maximum model requests per run
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    /// Enable or disable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = AgentConfig::new("be brief").with_max_steps(5).with_verbose(true);
        assert_eq!(config.system_prompt, "be brief");
        assert_eq!(config.max_steps, 5);
        assert!(config.verbose);

        let config = AgentConfig::default();
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
        assert!(!config.verbose);
    }
}
