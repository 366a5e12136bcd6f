//! Read tool for file contents
//!
//! Reads a UTF-8 file from the sandbox, truncating long files.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::io::ErrorKind;

use super::tool::ToolResult;
use crate::core::ToolErrorKind;
use crate::llm::FunctionDeclaration;
use crate::sandbox::SandboxRoot;

/// Maximum characters returned before truncation
pub const MAX_CHARS: usize = 10_000;

/// Input for the read tool
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadInput {
    /// Path to the file, relative to the sandbox root
    pub file_path: String,
}

/// Read a file inside the sandbox
pub fn get_file_content(root: &SandboxRoot, file_path: &str) -> Result<ToolResult> {
    let Some(target) = root.guard(file_path) else {
        return Ok(ToolResult::failure(
            ToolErrorKind::OutsideSandbox,
            format!(
                "Error: Cannot read \"{}\" as it is outside the permitted working directory",
                file_path
            ),
        ));
    };

    if !target.exists() {
        return Ok(ToolResult::failure(
            ToolErrorKind::NotFound,
            format!("Error: File not found: \"{}\"", file_path),
        ));
    }

    if !target.is_file() {
        return Ok(ToolResult::failure(
            ToolErrorKind::NotAFile,
            format!("Error: \"{}\" is not a regular file", file_path),
        ));
    }

    tracing::info!("Reading file: {}", target.display());

    let bytes = match fs::read(&target) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Ok(ToolResult::failure(
                ToolErrorKind::PermissionDenied,
                format!("Error: Permission denied reading file '{}'", file_path),
            ));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Could not read file '{}'", file_path));
        }
    };

    let Ok(content) = String::from_utf8(bytes) else {
        return Ok(ToolResult::failure(
            ToolErrorKind::DecodeError,
            format!("Error: Cannot decode file '{}' as UTF-8 text", file_path),
        ));
    };

    tracing::debug!("Read {} bytes", content.len());
    Ok(ToolResult::success(truncate(content, file_path)))
}

/// Keep the first `MAX_CHARS` characters and append a marker naming the file
fn truncate(content: String, file_path: &str) -> String {
    match content.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => {
            let mut truncated = content[..cut].to_string();
            truncated.push_str(&format!(
                "\n\n[...File \"{}\" truncated at {} characters]",
                file_path, MAX_CHARS
            ));
            truncated
        }
        None => content,
    }
}

pub fn declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: "get_file_content".to_string(),
        description: format!(
            "Reads the content of a file, constrained to the working directory. \
            Files longer than {} characters are truncated.",
            MAX_CHARS
        ),
        parameters: json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to read, relative to the working directory."
                }
            },
            "required": ["file_path"]
        }),
    }
}
