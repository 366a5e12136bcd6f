//! Runtime settings read from the environment

use std::env;
use std::path::PathBuf;

use crate::agent::DEFAULT_MAX_STEPS;
use crate::core::{AgentError, AgentResult};
use crate::llm::gemini::DEFAULT_MODEL;

pub const DEFAULT_SANDBOX_DIR: &str = "./calculator";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Settings for one process
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub sandbox_dir: PathBuf,
    pub max_steps: usize,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Read settings from environment variables
    ///
    /// - `GEMINI_API_KEY` (required)
    /// - `GEMINI_MODEL` (default `gemini-2.0-flash-001`)
    /// - `AGENT_SANDBOX_DIR` (default `./calculator`)
    /// - `AGENT_MAX_STEPS` (default 20)
    /// - `AGENT_LOG_DIR` (default `logs`)
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup
    pub fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AgentError::config("GEMINI_API_KEY environment variable not set"))?;

        let model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let sandbox_dir = lookup("AGENT_SANDBOX_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SANDBOX_DIR));

        let max_steps = match lookup("AGENT_MAX_STEPS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                AgentError::config(format!("AGENT_MAX_STEPS must be a positive integer: {}", e))
            })?,
            None => DEFAULT_MAX_STEPS,
        };
        if max_steps == 0 {
            return Err(AgentError::config("AGENT_MAX_STEPS must be at least 1"));
        }

        let log_dir = lookup("AGENT_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        Ok(Self {
            api_key,
            model,
            sandbox_dir,
            max_steps,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.sandbox_dir, PathBuf::from("./calculator"));
        assert_eq!(settings.max_steps, 20);
        assert_eq!(settings.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = Settings::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));

        let err = Settings::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.5-flash"),
            ("AGENT_SANDBOX_DIR", "/srv/box"),
            ("AGENT_MAX_STEPS", "7"),
        ]))
        .unwrap();
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.sandbox_dir, PathBuf::from("/srv/box"));
        assert_eq!(settings.max_steps, 7);
    }

    #[test]
    fn test_bad_step_budget() {
        for raw in ["zero", "0", "-3"] {
            let result =
                Settings::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k"), ("AGENT_MAX_STEPS", raw)]));
            assert!(matches!(result, Err(AgentError::Config(_))), "{raw}");
        }
    }
}
