//! Write tool for creating/writing files
//!
//! Writes content to a file inside the sandbox, creating parent directories.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::io::ErrorKind;

use super::tool::ToolResult;
use crate::core::ToolErrorKind;
use crate::llm::FunctionDeclaration;
use crate::sandbox::SandboxRoot;

/// Input for the write tool
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteInput {
    /// Path to the file, relative to the sandbox root
    pub file_path: String,
    /// Full new content of the file
    pub content: String,
}

/// Write `content` to a file inside the sandbox, replacing what was there
pub fn write_file(root: &SandboxRoot, file_path: &str, content: &str) -> Result<ToolResult> {
    let Some(target) = root.guard(file_path) else {
        return Ok(ToolResult::failure(
            ToolErrorKind::OutsideSandbox,
            format!(
                "Error: Cannot write to \"{}\" as it is outside the permitted working directory",
                file_path
            ),
        ));
    };

    // Also covers the sandbox root itself
    if target.is_dir() {
        return Ok(ToolResult::failure(
            ToolErrorKind::IsADirectory,
            format!(
                "Error: \"{}\" is a directory, cannot write file content to it",
                file_path
            ),
        ));
    }

    if let Some(parent) = target.parent() {
        if !parent.exists() {
            tracing::debug!("Creating directory: {}", parent.display());
            if let Err(e) = fs::create_dir_all(parent) {
                let result = if e.kind() == ErrorKind::PermissionDenied {
                    ToolResult::failure(
                        ToolErrorKind::PermissionDenied,
                        format!(
                            "Error: Permission denied creating directory structure for '{}'",
                            file_path
                        ),
                    )
                } else {
                    ToolResult::failure(
                        ToolErrorKind::DirectoryCreation,
                        format!(
                            "Error: Could not create directory structure for '{}': {}",
                            file_path, e
                        ),
                    )
                };
                return Ok(result);
            }
        }
    }

    tracing::info!("Writing file: {}", target.display());

    match fs::write(&target, content) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Ok(ToolResult::failure(
                ToolErrorKind::PermissionDenied,
                format!("Error: Permission denied writing to file '{}'", file_path),
            ));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Could not write to file '{}'", file_path));
        }
    }

    Ok(ToolResult::success(format!(
        "Successfully wrote to \"{}\" ({} characters written)",
        file_path,
        content.chars().count()
    )))
}

pub fn declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: "write_file".to_string(),
        description: "Writes content to a file, constrained to the working directory. \
            Creates missing parent directories and overwrites any existing file."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to write, relative to the working directory."
                },
                "content": {
                    "type": "string",
                    "description": "The full content to write to the file."
                }
            },
            "required": ["file_path", "content"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_parents() {
        let dir = tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();

        let result = write_file(&root, "a/b.txt", "hi").unwrap();
        assert_eq!(
            result,
            ToolResult::success("Successfully wrote to \"a/b.txt\" (2 characters written)")
        );
        assert!(root.path().join("a").is_dir());
        assert_eq!(fs::read_to_string(root.path().join("a/b.txt")).unwrap(), "hi");
    }

    #[test]
    fn test_write_replaces_content_and_counts_chars() {
        let dir = tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        fs::write(root.path().join("lorem.txt"), "a much longer original body").unwrap();

        let result = write_file(&root, "lorem.txt", "héllo").unwrap();
        assert!(result.output().contains("(5 characters written)"));
        assert_eq!(fs::read_to_string(root.path().join("lorem.txt")).unwrap(), "héllo");
    }

    #[test]
    fn test_write_refuses_directories() {
        let dir = tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        fs::create_dir(root.path().join("pkg")).unwrap();

        let result = write_file(&root, "pkg", "x").unwrap();
        assert_eq!(result.kind(), Some(ToolErrorKind::IsADirectory));

        let result = write_file(&root, ".", "x").unwrap();
        assert_eq!(result.kind(), Some(ToolErrorKind::IsADirectory));
        assert!(root.path().is_dir());
    }

    #[test]
    fn test_write_outside_sandbox_touches_nothing() {
        let outer = tempdir().unwrap();
        fs::create_dir(outer.path().join("box")).unwrap();
        let root = SandboxRoot::new(outer.path().join("box")).unwrap();

        let result = write_file(&root, "../escape/temp.txt", "nope").unwrap();
        assert_eq!(result.kind(), Some(ToolErrorKind::OutsideSandbox));
        assert!(!outer.path().join("escape").exists());
    }

    #[test]
    fn test_parent_directory_cannot_be_created() {
        let dir = tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        fs::write(root.path().join("plain"), "x").unwrap();

        let result = write_file(&root, "plain/sub/child.txt", "x").unwrap();
        assert_eq!(result.kind(), Some(ToolErrorKind::DirectoryCreation));
        assert!(result
            .output()
            .starts_with("Error: Could not create directory structure for 'plain/sub/child.txt': "));
        assert_eq!(fs::read_to_string(root.path().join("plain")).unwrap(), "x");
    }

    #[test]
    fn test_parent_is_a_file_is_unexpected() {
        let dir = tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        fs::write(root.path().join("plain"), "x").unwrap();

        // The parent exists, so nothing is created and the write itself fails
        let err = write_file(&root, "plain/child.txt", "x").unwrap_err();
        assert!(format!("{:#}", err).starts_with("Could not write to file 'plain/child.txt': "));
    }
}
