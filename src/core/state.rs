//! Agent state types

use super::error::AgentError;
use crate::llm::{Content, FunctionCall, Usage};

/// State of the turn loop
#[derive(Debug)]
pub enum LoopState {
    /// Waiting for the next model turn
    Requesting,

    /// Running the tool calls of the latest model turn, in order
    ToolExecuting(Vec<FunctionCall>),

    /// The model produced final text
    Done(String),

    /// The run was stopped by a fatal error
    Aborted(AgentError),
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopState::Requesting => write!(f, "Requesting"),
            LoopState::ToolExecuting(calls) => write!(f, "Executing {} tool call(s)", calls.len()),
            LoopState::Done(_) => write!(f, "Done"),
            LoopState::Aborted(err) => write!(f, "Aborted: {}", err),
        }
    }
}

/// Conversation and step accounting for one run
///
/// The conversation is append-only: messages can be added and read, never
/// edited or removed.
#[derive(Debug, Clone)]
pub struct AgentState {
    messages: Vec<Content>,
    step: usize,
    step_budget: usize,
    last_usage: Option<Usage>,
}

impl AgentState {
    pub fn new(step_budget: usize) -> Self {
        Self {
            messages: Vec::new(),
            step: 0,
            step_budget,
            last_usage: None,
        }
    }

    /// Append a message to the conversation
    pub fn push(&mut self, message: Content) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Content] {
        &self.messages
    }

    /// Number of model requests made so far
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_budget(&self) -> usize {
        self.step_budget
    }

    /// Consume one step of the budget; false once the budget is spent
    pub fn begin_step(&mut self) -> bool {
        if self.step >= self.step_budget {
            return false;
        }
        self.step += 1;
        true
    }

    /// Record token usage for the latest model call
    pub fn record_usage(&mut self, usage: Usage) {
        self.last_usage = Some(usage);
    }

    /// Usage reported by the most recent model call
    pub fn last_usage(&self) -> Option<Usage> {
        self.last_usage
    }
}
