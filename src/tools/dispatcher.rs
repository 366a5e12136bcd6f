//! Tool dispatcher
//!
//! Turns a model tool-call request into exactly one tool-role message:
//! resolve the tool, inject the sandbox root, normalize legacy argument
//! names, run the handler and wrap whatever comes out.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::list_tool::{self, ListInput};
use super::read_tool::{self, ReadInput};
use super::run_tool::{self, RunInput};
use super::tool::{ToolCallRequest, ToolName, ToolResult};
use super::write_tool::{self, WriteInput};
use crate::core::ToolErrorKind;
use crate::llm::Content;
use crate::sandbox::SandboxRoot;

/// Argument name the model might use to redirect the sandbox; always dropped
const ROOT_ARGUMENT: &str = "working_directory";

/// Alternate argument names still accepted: (tool, legacy, canonical)
const LEGACY_ALIASES: &[(ToolName, &str, &str)] = &[
    (ToolName::GetFileContent, "file", "file_path"),
    (ToolName::RunPythonFile, "file", "file_path"),
];

/// A parsed, ready-to-run tool call
#[derive(Debug)]
enum Invocation {
    GetFilesInfo(ListInput),
    GetFileContent(ReadInput),
    WriteFile(WriteInput),
    RunPythonFile(RunInput),
}

impl Invocation {
    fn parse(tool: ToolName, args: Map<String, Value>) -> Result<Self, serde_json::Error> {
        fn parse_args<T: DeserializeOwned>(args: Map<String, Value>) -> Result<T, serde_json::Error> {
            serde_json::from_value(Value::Object(args))
        }

        Ok(match tool {
            ToolName::GetFilesInfo => Invocation::GetFilesInfo(parse_args(args)?),
            ToolName::GetFileContent => Invocation::GetFileContent(parse_args(args)?),
            ToolName::WriteFile => Invocation::WriteFile(parse_args(args)?),
            ToolName::RunPythonFile => Invocation::RunPythonFile(parse_args(args)?),
        })
    }
}

/// Routes tool calls to their handlers within one sandbox
pub struct Dispatcher {
    root: SandboxRoot,
}

impl Dispatcher {
    pub fn new(root: SandboxRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SandboxRoot {
        &self.root
    }

    /// Run a request and wrap the outcome in a tool-role message
    ///
    /// The message carries one part `{name, response: {result} | {error}}`.
    pub async fn dispatch(&self, request: &ToolCallRequest) -> Content {
        let result = self.execute(request).await;
        Content::tool_response(request.name.clone(), result.into_response())
    }

    /// Run a request, classifying every failure
    pub async fn execute(&self, request: &ToolCallRequest) -> ToolResult {
        let Some(tool) = ToolName::parse(&request.name) else {
            tracing::warn!("Unknown tool requested: {}", request.name);
            return ToolResult::failure(
                ToolErrorKind::UnknownTool,
                format!("Unknown function: {}", request.name),
            );
        };

        let args = normalize_args(tool, request.args.clone());

        let invocation = match Invocation::parse(tool, args) {
            Ok(invocation) => invocation,
            Err(e) => {
                tracing::warn!("Invalid arguments for {}: {}", tool, e);
                return ToolResult::failure(
                    ToolErrorKind::InvalidArgument,
                    format!("Argument error: {}", e),
                );
            }
        };

        tracing::info!("Executing tool: {}", tool);
        tracing::debug!("Invocation: {:?}", invocation);

        let result = match self.invoke(invocation).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Tool {} failed: {:#}", tool, e);
                ToolResult::failure(
                    ToolErrorKind::ExecutionFailure,
                    format!("Execution error: {:#}", e),
                )
            }
        };

        tracing::debug!("Tool {} completed. Is error: {}", tool, result.is_error());
        result
    }

    async fn invoke(&self, invocation: Invocation) -> anyhow::Result<ToolResult> {
        let root = &self.root;
        match invocation {
            Invocation::GetFilesInfo(input) => {
                list_tool::get_files_info(root, input.directory.as_deref())
            }
            Invocation::GetFileContent(input) => read_tool::get_file_content(root, &input.file_path),
            Invocation::WriteFile(input) => {
                write_tool::write_file(root, &input.file_path, &input.content)
            }
            Invocation::RunPythonFile(input) => {
                run_tool::run_python_file(root, &input.file_path, &input.args).await
            }
        }
    }
}

/// Turns one tool call into one tool-role message for the agent loop
#[async_trait::async_trait]
pub trait ToolDispatch: Send + Sync {
    async fn dispatch(&self, request: &ToolCallRequest) -> Content;
}

#[async_trait::async_trait]
impl ToolDispatch for Dispatcher {
    async fn dispatch(&self, request: &ToolCallRequest) -> Content {
        Dispatcher::dispatch(self, request).await
    }
}

/// Drop any caller-supplied root and rename legacy arguments
fn normalize_args(tool: ToolName, mut args: Map<String, Value>) -> Map<String, Value> {
    if args.remove(ROOT_ARGUMENT).is_some() {
        tracing::debug!("Discarded caller-supplied {} for {}", ROOT_ARGUMENT, tool);
    }

    for (aliased_tool, legacy, canonical) in LEGACY_ALIASES {
        if *aliased_tool == tool && !args.contains_key(*canonical) {
            if let Some(value) = args.remove(*legacy) {
                args.insert(canonical.to_string(), value);
            }
        }
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn request(name: &str, args: Value) -> ToolCallRequest {
        let Value::Object(map) = args else {
            panic!("args must be an object");
        };
        ToolCallRequest::new(name, map)
    }

    fn dispatcher() -> (tempfile::TempDir, Dispatcher) {
        let dir = tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        (dir, Dispatcher::new(root))
    }

    #[test]
    fn test_normalize_args() {
        let args = normalize_args(
            ToolName::GetFileContent,
            json!({ "file": "main.py", "working_directory": "/" })
                .as_object()
                .unwrap()
                .clone(),
        );
        assert_eq!(Value::Object(args), json!({ "file_path": "main.py" }));

        // Canonical name wins when both are present
        let args = normalize_args(
            ToolName::RunPythonFile,
            json!({ "file": "a.py", "file_path": "b.py" })
                .as_object()
                .unwrap()
                .clone(),
        );
        assert_eq!(args["file_path"], "b.py");

        // No alias for write_file
        let args = normalize_args(
            ToolName::WriteFile,
            json!({ "file": "a.txt" }).as_object().unwrap().clone(),
        );
        assert!(args.contains_key("file"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (_dir, dispatcher) = dispatcher();
        let message = dispatcher.dispatch(&request("rm_rf", json!({}))).await;

        let resp = message.function_response().unwrap();
        assert_eq!(resp.name, "rm_rf");
        assert_eq!(resp.error(), Some("Unknown function: rm_rf"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let (_dir, dispatcher) = dispatcher();

        let result = dispatcher.execute(&request("get_file_content", json!({}))).await;
        assert_eq!(result.kind(), Some(ToolErrorKind::InvalidArgument));
        assert!(result.output().starts_with("Argument error:"));

        let result = dispatcher
            .execute(&request("write_file", json!({ "file_path": "a.txt", "content": 5 })))
            .await;
        assert_eq!(result.kind(), Some(ToolErrorKind::InvalidArgument));

        let result = dispatcher
            .execute(&request("get_files_info", json!({ "directory": ".", "recursive": true })))
            .await;
        assert_eq!(result.kind(), Some(ToolErrorKind::InvalidArgument));
    }

    #[tokio::test]
    async fn test_root_cannot_be_overridden() {
        let outer = tempdir().unwrap();
        fs::create_dir(outer.path().join("box")).unwrap();
        fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
        let dispatcher = Dispatcher::new(SandboxRoot::new(outer.path().join("box")).unwrap());

        let result = dispatcher
            .execute(&request(
                "get_file_content",
                json!({
                    "file_path": "secret.txt",
                    "working_directory": outer.path().to_str().unwrap()
                }),
            ))
            .await;
        assert_eq!(result.kind(), Some(ToolErrorKind::NotFound));
        assert!(!result.output().contains("top secret"));
    }

    #[tokio::test]
    async fn test_legacy_file_alias_reads() {
        let (_dir, dispatcher) = dispatcher();
        fs::write(dispatcher.root().path().join("main.py"), "print(1)").unwrap();

        let message = dispatcher
            .dispatch(&request("get_file_content", json!({ "file": "main.py" })))
            .await;
        let resp = message.function_response().unwrap();
        assert_eq!(resp.result(), Some(&json!("print(1)")));
    }

    #[tokio::test]
    async fn test_handler_failure_becomes_error_envelope() {
        let (_dir, dispatcher) = dispatcher();
        let message = dispatcher
            .dispatch(&request("get_files_info", json!({ "directory": ".." })))
            .await;

        assert_eq!(message.parts.len(), 1);
        let resp = message.function_response().unwrap();
        assert_eq!(resp.name, "get_files_info");
        assert!(resp.error().unwrap().contains("outside the working directory"));
        assert!(resp.result().is_none());
    }

    #[tokio::test]
    async fn test_unexpected_write_fault_is_execution_failure() {
        let (_dir, dispatcher) = dispatcher();
        fs::write(dispatcher.root().path().join("plain"), "x").unwrap();

        let result = dispatcher
            .execute(&request(
                "write_file",
                json!({ "file_path": "plain/child.txt", "content": "x" }),
            ))
            .await;
        assert_eq!(result.kind(), Some(ToolErrorKind::ExecutionFailure));
        assert!(result
            .output()
            .starts_with("Execution error: Could not write to file 'plain/child.txt': "));

        let result = dispatcher
            .execute(&request(
                "write_file",
                json!({ "file_path": "plain/sub/child.txt", "content": "x" }),
            ))
            .await;
        assert_eq!(result.kind(), Some(ToolErrorKind::DirectoryCreation));
    }
}
