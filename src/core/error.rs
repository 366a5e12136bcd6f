//! Error types for tool execution and the agent run

use thiserror::Error;

/// Classification of a failed tool call
///
/// The kind travels alongside the human-readable message so callers can
/// branch on it instead of parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolErrorKind {
    /// Target path resolves outside the sandbox root
    OutsideSandbox,
    /// Target does not exist
    NotFound,
    /// Target exists but is not a regular file
    NotAFile,
    /// Target exists but is not a directory
    NotADirectory,
    /// Target is a directory where a file was expected
    IsADirectory,
    /// The OS refused access
    PermissionDenied,
    /// File content is not valid UTF-8
    DecodeError,
    /// File lacks the script extension
    NotAScript,
    /// Script exceeded its wall-clock limit
    Timeout,
    /// Script process could not be started
    LaunchFailure,
    /// Parent directories could not be created
    DirectoryCreation,
    /// No tool with the requested name
    UnknownTool,
    /// Arguments do not match the tool's parameters
    InvalidArgument,
    /// Any other fault raised while running a tool
    ExecutionFailure,
}

impl std::fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ToolErrorKind::OutsideSandbox => "outside sandbox",
            ToolErrorKind::NotFound => "not found",
            ToolErrorKind::NotAFile => "not a file",
            ToolErrorKind::NotADirectory => "not a directory",
            ToolErrorKind::IsADirectory => "is a directory",
            ToolErrorKind::PermissionDenied => "permission denied",
            ToolErrorKind::DecodeError => "decode error",
            ToolErrorKind::NotAScript => "not a script",
            ToolErrorKind::Timeout => "timeout",
            ToolErrorKind::LaunchFailure => "launch failure",
            ToolErrorKind::DirectoryCreation => "directory creation failed",
            ToolErrorKind::UnknownTool => "unknown tool",
            ToolErrorKind::InvalidArgument => "invalid argument",
            ToolErrorKind::ExecutionFailure => "execution failure",
        };
        f.write_str(name)
    }
}

/// A classified tool failure carrying the message shown to the model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Errors that end an agent run
#[derive(Error, Debug)]
pub enum AgentError {
    /// A tool-response message lacked its function response part
    #[error("Invalid tool response structure: missing function_response part")]
    MalformedToolResponse,

    /// The model provider call failed
    #[error("Error during generate_content at step {step}")]
    Provider {
        step: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Invalid or missing configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AgentError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AgentError::Config(msg.into())
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
