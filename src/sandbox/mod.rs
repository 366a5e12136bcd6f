//! Sandbox root and path containment
//!
//! Every tool resolves its target through [`SandboxRoot::guard`] before
//! touching the filesystem. Containment is decided on the lexically
//! normalized path, then re-checked against the real location of the deepest
//! existing ancestor so a symlink inside the sandbox cannot lead out of it.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// The directory outside of which no tool may act
///
/// Created once at startup from a canonicalized directory and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRoot {
    path: PathBuf,
}

impl SandboxRoot {
    /// Create a sandbox root from an existing directory
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let path = dir
            .canonicalize()
            .with_context(|| format!("Sandbox directory not accessible: {}", dir.display()))?;

        if !path.is_dir() {
            anyhow::bail!("Sandbox root is not a directory: {}", path.display());
        }

        tracing::info!("Sandbox root: {}", path.display());
        Ok(Self { path })
    }

    /// Absolute, normalized root path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a candidate path against this root
    pub fn resolve(&self, candidate: &str) -> PathBuf {
        resolve(&self.path, candidate)
    }

    /// Whether `path` is the root or lies beneath it
    pub fn contains(&self, path: &Path) -> bool {
        contains(&self.path, path)
    }

    /// Resolve `candidate` and return it only if it stays inside the sandbox
    pub fn guard(&self, candidate: &str) -> Option<PathBuf> {
        let resolved = self.resolve(candidate);

        if !self.contains(&resolved) {
            tracing::warn!("Rejected path outside sandbox: {}", candidate);
            return None;
        }

        if !self.real_path_within(&resolved) {
            tracing::warn!("Rejected path escaping sandbox through a link: {}", candidate);
            return None;
        }

        Some(resolved)
    }

    /// Canonicalize the deepest existing ancestor and check it is still inside
    fn real_path_within(&self, path: &Path) -> bool {
        for ancestor in path.ancestors() {
            // symlink_metadata so dangling links count as existing entries
            if ancestor.symlink_metadata().is_ok() {
                return match ancestor.canonicalize() {
                    Ok(real) => real.starts_with(&self.path),
                    Err(_) => false,
                };
            }
        }
        false
    }
}

/// Resolve a candidate against `root`
///
/// Relative candidates are joined onto the root; absolute candidates are
/// taken as-is. The result is lexically normalized.
pub fn resolve(root: &Path, candidate: &str) -> PathBuf {
    let candidate = Path::new(candidate);
    if candidate.is_absolute() {
        normalize(candidate)
    } else {
        normalize(&root.join(candidate))
    }
}

/// True iff the normalized `path` equals `root` or is a descendant of it
///
/// Comparison is component-wise, so `/sandbox-other` is not inside `/sandbox`.
pub fn contains(root: &Path, path: &Path) -> bool {
    normalize(path).starts_with(normalize(root))
}

/// Remove `.` components and fold `..` without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = normalized.pop();
            }
            Component::Prefix(prefix) => {
                normalized = PathBuf::from(prefix.as_os_str());
            }
            Component::RootDir => {
                normalized.push(component.as_os_str());
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
