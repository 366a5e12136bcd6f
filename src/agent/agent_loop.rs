//! Agent turn loop
//!
//! prompt → model → if tool calls, run them in order and append each
//! response → model again → until the model answers with text or the step
//! budget runs out.

use std::sync::Arc;

use tracing::Instrument;

use crate::cli::Console;
use crate::core::{AgentError, AgentResult, AgentState, LoopState};
use crate::llm::{Content, FunctionCall, FunctionDeclaration, FunctionResponse, LlmProvider};
use crate::tools::{self, ToolCallRequest, ToolDispatch};

use super::config::AgentConfig;

/// How a run ended without a fatal error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The model answered with final text
    Completed { text: String },
    /// The step budget ran out before a final answer
    StepBudgetExhausted { steps: usize },
}

/// Drives one conversation between the model and the sandboxed tools
pub struct Agent {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
    dispatcher: Box<dyn ToolDispatch>,
    console: Console,
    tools: Vec<FunctionDeclaration>,
    state: AgentState,
}

impl Agent {
    pub fn new(
        config: AgentConfig,
        llm: Arc<dyn LlmProvider>,
        dispatcher: impl ToolDispatch + 'static,
        console: Console,
    ) -> Self {
        tracing::info!(
            "Creating agent (provider: {}, model: {}, max steps: {})",
            llm.provider_name(),
            llm.model(),
            config.max_steps
        );

        let state = AgentState::new(config.max_steps);
        Self {
            config,
            llm,
            dispatcher: Box::new(dispatcher),
            console,
            tools: tools::declarations(),
            state,
        }
    }

    /// Conversation and counters so far
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Run the loop for a user prompt
    pub async fn run(&mut self, prompt: &str) -> AgentResult<AgentOutcome> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("agent_run", %run_id);
        self.run_loop(prompt).instrument(span).await
    }

    async fn run_loop(&mut self, prompt: &str) -> AgentResult<AgentOutcome> {
        tracing::info!("Starting agent loop");
        self.state.push(Content::user(prompt));

        let mut loop_state = LoopState::Requesting;

        loop {
            tracing::debug!("Loop state: {}", loop_state);

            loop_state = match loop_state {
                LoopState::Requesting => {
                    if !self.state.begin_step() {
                        tracing::warn!(
                            "Step budget of {} exhausted without a final response",
                            self.state.step_budget()
                        );
                        return Ok(AgentOutcome::StepBudgetExhausted {
                            steps: self.state.step(),
                        });
                    }
                    self.request_turn().await.unwrap_or_else(LoopState::Aborted)
                }

                LoopState::ToolExecuting(calls) => {
                    self.execute_tools(calls).await.unwrap_or_else(LoopState::Aborted)
                }

                LoopState::Done(text) => {
                    tracing::info!("Agent finished after {} step(s)", self.state.step());
                    return Ok(AgentOutcome::Completed { text });
                }

                LoopState::Aborted(err) => {
                    tracing::error!(error = ?err, "Agent aborted at step {}: {}", self.state.step(), err);
                    return Err(err);
                }
            };
        }
    }

    /// Submit the whole conversation and decide what follows
    async fn request_turn(&mut self) -> AgentResult<LoopState> {
        let step = self.state.step();
        tracing::info!("Requesting model turn {}/{}", step, self.state.step_budget());

        let turn = self
            .llm
            .generate(self.state.messages(), Some(self.config.system_prompt.as_str()), &self.tools)
            .await
            .map_err(|source| AgentError::Provider { step, source })?;

        if let Some(usage) = turn.usage {
            self.state.record_usage(usage);
        }

        let calls = turn.function_calls();
        let text = turn.text();

        if let Some(content) = turn.content {
            self.state.push(content);
        }

        if !calls.is_empty() {
            tracing::info!("Model requested {} tool call(s)", calls.len());
            Ok(LoopState::ToolExecuting(calls))
        } else if let Some(text) = text {
            Ok(LoopState::Done(text))
        } else {
            tracing::debug!("Model turn had neither text nor tool calls");
            Ok(LoopState::Requesting)
        }
    }

    /// Run tool calls one at a time, appending each response before the next
    async fn execute_tools(&mut self, calls: Vec<FunctionCall>) -> AgentResult<LoopState> {
        for call in &calls {
            let request = ToolCallRequest::from(call);

            if self.config.verbose {
                self.console.print_tool_call_verbose(&request.name, &request.args);
            } else {
                self.console.print_tool_call(&request.name);
            }

            let message = self.dispatcher.dispatch(&request).await;
            let response = validate_tool_response(&message)?;

            if self.config.verbose {
                self.console.print_tool_response(&response.response);
            }

            self.state.push(message);
        }

        Ok(LoopState::Requesting)
    }
}

/// A tool message must lead with its function response
pub fn validate_tool_response(message: &Content) -> AgentResult<&FunctionResponse> {
    message
        .function_response()
        .ok_or(AgentError::MalformedToolResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Part, Role};
    use serde_json::json;

    #[test]
    fn test_validate_tool_response() {
        let good = Content::tool_response("write_file", json!({ "result": "ok" }));
        assert_eq!(validate_tool_response(&good).unwrap().name, "write_file");

        let empty = Content {
            role: Role::Tool,
            parts: vec![],
        };
        assert!(matches!(
            validate_tool_response(&empty),
            Err(AgentError::MalformedToolResponse)
        ));

        let text_only = Content {
            role: Role::Tool,
            parts: vec![Part::Text("oops".into())],
        };
        assert!(validate_tool_response(&text_only).is_err());
    }
}
