//! Run tool for executing Python scripts
//!
//! Runs a script from the sandbox as a subprocess with the sandbox root as
//! working directory and a hard wall-clock limit.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::tool::ToolResult;
use crate::core::{ToolError, ToolErrorKind};
use crate::llm::FunctionDeclaration;
use crate::sandbox::SandboxRoot;

/// Extension a file must carry to be runnable
pub const SCRIPT_EXTENSION: &str = "py";
/// Interpreter used to launch scripts
pub const INTERPRETER: &str = "python3";
/// Wall-clock limit for a script run
pub const TIMEOUT: Duration = Duration::from_secs(30);

/// Input for the run tool
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunInput {
    /// Path to the script, relative to the sandbox root
    pub file_path: String,
    /// Command-line arguments passed to the script
    #[serde(default)]
    pub args: Vec<String>,
}

/// Run a Python script inside the sandbox
pub async fn run_python_file(
    root: &SandboxRoot,
    file_path: &str,
    args: &[String],
) -> Result<ToolResult> {
    run_with_timeout(root, file_path, args, TIMEOUT).await
}

async fn run_with_timeout(
    root: &SandboxRoot,
    file_path: &str,
    args: &[String],
    limit: Duration,
) -> Result<ToolResult> {
    let target = match locate_script(root, file_path) {
        Ok(target) => target,
        Err(e) => return Ok(e.into()),
    };

    tracing::info!("Executing script: {} {:?}", target.display(), args);
    tracing::debug!("Working directory: {}", root.path().display());
    tracing::debug!("Timeout: {}s", limit.as_secs());

    let child = Command::new(INTERPRETER)
        .arg(&target)
        .args(args)
        .current_dir(root.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!("Failed to launch {}: {}", INTERPRETER, e);
            return Ok(ToolResult::failure(
                ToolErrorKind::LaunchFailure,
                format!("Error: executing Python file: {}", e),
            ));
        }
    };

    // Dropping the future on timeout drops the child, which kills it
    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(result) => result.with_context(|| format!("Failed to wait for \"{}\"", file_path))?,
        Err(_) => {
            tracing::warn!("Script timed out after {}s: {}", limit.as_secs(), file_path);
            return Ok(ToolResult::failure(
                ToolErrorKind::Timeout,
                format!(
                    "Error: executing Python file: \"{}\" timed out after {} seconds",
                    file_path,
                    limit.as_secs()
                ),
            ));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    tracing::debug!("Script exit status: {}", output.status);

    Ok(ToolResult::success(format_report(
        &stdout,
        &stderr,
        output.status.code(),
    )))
}

/// Resolve a script path, refusing anything that must not be launched
fn locate_script(root: &SandboxRoot, file_path: &str) -> std::result::Result<PathBuf, ToolError> {
    let target = root.guard(file_path).ok_or_else(|| {
        ToolError::new(
            ToolErrorKind::OutsideSandbox,
            format!(
                "Error: Cannot execute \"{}\" as it is outside the permitted working directory",
                file_path
            ),
        )
    })?;

    // Checked before existence so a non-script is never considered for launch
    if target.extension().and_then(|e| e.to_str()) != Some(SCRIPT_EXTENSION) {
        return Err(ToolError::new(
            ToolErrorKind::NotAScript,
            format!("Error: \"{}\" is not a Python file.", file_path),
        ));
    }

    if !target.is_file() {
        return Err(ToolError::new(
            ToolErrorKind::NotFound,
            format!("Error: File \"{}\" not found.", file_path),
        ));
    }

    Ok(target)
}

/// Compose the report shown to the model
fn format_report(stdout: &str, stderr: &str, code: Option<i32>) -> String {
    let mut report = String::new();

    if !stdout.is_empty() {
        report.push_str("STDOUT:\n");
        report.push_str(stdout);
    }
    if !stderr.is_empty() {
        report.push_str("\nSTDERR:\n");
        report.push_str(stderr);
    }
    match code {
        Some(0) => {}
        Some(code) => report.push_str(&format!("\nProcess exited with code {}", code)),
        None => report.push_str("\nProcess terminated by signal"),
    }

    let trimmed = report.trim();
    if trimmed.is_empty() {
        "No output produced.".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: "run_python_file".to_string(),
        description: "Executes a Python file with optional arguments, constrained to the \
            working directory. Returns stdout, stderr and a non-zero exit code."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the Python file to run, relative to the working directory."
                },
                "args": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional command-line arguments for the script."
                }
            },
            "required": ["file_path"]
        }),
    }
}
