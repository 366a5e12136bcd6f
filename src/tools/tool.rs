//! Tool request/result types and the closed set of tools
//!
//! Every tool call yields exactly one `ToolResult`, which the dispatcher
//! folds into a tool-role conversation message.

use serde_json::{json, Map, Value};

use crate::core::{ToolError, ToolErrorKind};
use crate::llm::{FunctionCall, FunctionDeclaration};

use super::{list_tool, read_tool, run_tool, write_tool};

/// A tool call as requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    pub args: Map<String, Value>,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl From<&FunctionCall> for ToolCallRequest {
    fn from(call: &FunctionCall) -> Self {
        Self::new(call.name.clone(), call.args.clone())
    }
}

/// Result of executing a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    /// The tool ran; `payload` is its report
    Success { payload: String },
    /// The tool refused or failed in a classified way
    Failure { kind: ToolErrorKind, message: String },
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(payload: impl Into<String>) -> Self {
        ToolResult::Success {
            payload: payload.into(),
        }
    }

    /// Create a failed tool result
    pub fn failure(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        ToolResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Failure { .. })
    }

    /// Error kind, if this is a failure
    pub fn kind(&self) -> Option<ToolErrorKind> {
        match self {
            ToolResult::Success { .. } => None,
            ToolResult::Failure { kind, .. } => Some(*kind),
        }
    }

    /// The human-readable text, payload or error message alike
    pub fn output(&self) -> &str {
        match self {
            ToolResult::Success { payload } => payload,
            ToolResult::Failure { message, .. } => message,
        }
    }

    /// Build the `{result: ...}` / `{error: ...}` response object
    pub fn into_response(self) -> Value {
        match self {
            ToolResult::Success { payload } => json!({ "result": payload }),
            ToolResult::Failure { message, .. } => json!({ "error": message }),
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::Failure {
            kind: err.kind,
            message: err.message,
        }
    }
}

/// The tools the agent can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetFilesInfo,
    GetFileContent,
    WriteFile,
    RunPythonFile,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::GetFilesInfo,
        ToolName::GetFileContent,
        ToolName::WriteFile,
        ToolName::RunPythonFile,
    ];

    /// Look up a tool by its wire name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetFilesInfo => "get_files_info",
            ToolName::GetFileContent => "get_file_content",
            ToolName::WriteFile => "write_file",
            ToolName::RunPythonFile => "run_python_file",
        }
    }

    /// Declaration sent to the model provider
    pub fn declaration(&self) -> FunctionDeclaration {
        match self {
            ToolName::GetFilesInfo => list_tool::declaration(),
            ToolName::GetFileContent => read_tool::declaration(),
            ToolName::WriteFile => write_tool::declaration(),
            ToolName::RunPythonFile => run_tool::declaration(),
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
