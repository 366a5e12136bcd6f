//! List tool for directory contents
//!
//! Lists the immediate children of a sandboxed directory with their sizes.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::io::ErrorKind;

use super::tool::ToolResult;
use crate::core::ToolErrorKind;
use crate::llm::FunctionDeclaration;
use crate::sandbox::SandboxRoot;

/// Input for the list tool
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListInput {
    /// Directory to list, relative to the sandbox root (root if absent)
    #[serde(default)]
    pub directory: Option<String>,
}

/// List a directory inside the sandbox
///
/// Entries are sorted by name (byte-wise, case-sensitive) and reported as
/// `- NAME: file_size=N bytes, is_dir=BOOL`.
pub fn get_files_info(root: &SandboxRoot, directory: Option<&str>) -> Result<ToolResult> {
    let shown = directory.unwrap_or(".");

    let Some(target) = root.guard(shown) else {
        return Ok(ToolResult::failure(
            ToolErrorKind::OutsideSandbox,
            format!("Error: Directory '{}' is outside the working directory", shown),
        ));
    };

    if !target.is_dir() {
        return Ok(ToolResult::failure(
            ToolErrorKind::NotADirectory,
            format!("Error: '{}' is not a valid directory", shown),
        ));
    }

    tracing::info!("Listing directory: {}", target.display());

    let read_dir = match fs::read_dir(&target) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Ok(ToolResult::failure(
                ToolErrorKind::PermissionDenied,
                format!("Error: Permission denied accessing directory '{}'", shown),
            ));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Could not read directory '{}'", shown));
        }
    };

    let mut entries = read_dir
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Could not read directory '{}'", shown))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut lines = vec![format!("Contents of '{}':", shown)];
    for entry in entries {
        let path = entry.path();
        // Follow links for size; fall back to the link itself when dangling
        let metadata = fs::metadata(&path)
            .or_else(|_| fs::symlink_metadata(&path))
            .with_context(|| format!("Could not stat '{}'", path.display()))?;

        lines.push(format!(
            "- {}: file_size={} bytes, is_dir={}",
            entry.file_name().to_string_lossy(),
            metadata.len(),
            metadata.is_dir()
        ));
    }

    tracing::debug!("Listed {} entries", lines.len() - 1);
    Ok(ToolResult::success(lines.join("\n")))
}

pub fn declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: "get_files_info".to_string(),
        description: "Lists files in the specified directory along with their sizes, \
            constrained to the working directory."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "The directory to list files from, relative to the working directory. \
                        If not provided, lists files in the working directory itself."
                }
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sandbox() -> (tempfile::TempDir, SandboxRoot) {
        let dir = tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_lists_sorted_with_sizes() {
        let (_dir, root) = sandbox();
        fs::write(root.path().join("b.txt"), "hello").unwrap();
        fs::write(root.path().join("B.txt"), "").unwrap();
        fs::write(root.path().join("a.py"), "print(1)\n").unwrap();
        fs::create_dir(root.path().join("pkg")).unwrap();

        let result = get_files_info(&root, None).unwrap();
        assert!(!result.is_error());

        let lines: Vec<&str> = result.output().lines().collect();
        assert_eq!(lines[0], "Contents of '.':");
        assert_eq!(lines[1], "- B.txt: file_size=0 bytes, is_dir=false");
        assert_eq!(lines[2], "- a.py: file_size=9 bytes, is_dir=false");
        assert_eq!(lines[3], "- b.txt: file_size=5 bytes, is_dir=false");
        assert!(lines[4].starts_with("- pkg: file_size="));
        assert!(lines[4].ends_with("is_dir=true"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_lists_subdirectory() {
        let (_dir, root) = sandbox();
        fs::create_dir(root.path().join("pkg")).unwrap();
        fs::write(root.path().join("pkg/calc.py"), "x").unwrap();

        let result = get_files_info(&root, Some("pkg")).unwrap();
        assert_eq!(
            result.output(),
            "Contents of 'pkg':\n- calc.py: file_size=1 bytes, is_dir=false"
        );
    }

    #[test]
    fn test_parent_is_outside_sandbox() {
        let (_dir, root) = sandbox();
        let result = get_files_info(&root, Some("..")).unwrap();
        assert_eq!(result.kind(), Some(ToolErrorKind::OutsideSandbox));
        assert!(result.output().starts_with("Error:"));
        assert!(!result.output().contains("Contents of"));

        let result = get_files_info(&root, Some("/bin")).unwrap();
        assert_eq!(result.kind(), Some(ToolErrorKind::OutsideSandbox));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let (_dir, root) = sandbox();
        fs::write(root.path().join("main.py"), "").unwrap();

        let result = get_files_info(&root, Some("main.py")).unwrap();
        assert_eq!(result.kind(), Some(ToolErrorKind::NotADirectory));
        assert_eq!(result.output(), "Error: 'main.py' is not a valid directory");

        let result = get_files_info(&root, Some("missing")).unwrap();
        assert_eq!(result.kind(), Some(ToolErrorKind::NotADirectory));
    }
}
