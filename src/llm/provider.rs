//! LLM Provider trait
//!
//! Abstracts the model interface so the agent loop can run against Gemini
//! or any other backend (including scripted providers in tests).

use anyhow::Result;

use super::types::{Content, FunctionDeclaration, ModelTurn};

/// Trait for model providers driven by the agent loop.
///
/// A provider receives the full conversation on every call and returns the
/// next model turn. Transport and provider faults are returned as errors and
/// end the run; the loop never retries them.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request the next model turn for the given conversation.
    async fn generate(
        &self,
        contents: &[Content],
        system_instruction: Option<&str>,
        tools: &[FunctionDeclaration],
    ) -> Result<ModelTurn>;

    /// Get the current model name.
    fn model(&self) -> String;

    /// Get the provider name (e.g., "gemini").
    fn provider_name(&self) -> &str;
}
