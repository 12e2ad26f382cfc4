//! ToolContext - execution context for tools

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::ToolError;

/// Execution context for tools
///
/// Relative paths resolve against `root`. With the sandbox enabled, a path
/// that resolves outside `root` (through `..` or a symlink) is rejected.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Directory all relative paths are resolved against
    pub root: PathBuf,

    /// Whether sandbox mode is enabled (default: true)
    pub sandbox_enabled: bool,
}

impl ToolContext {
    /// Create a sandboxed context
    pub fn new(root: PathBuf) -> Self {
        debug!(?root, "ToolContext::new: called");
        Self {
            root,
            sandbox_enabled: true,
        }
    }

    /// Create a context with sandbox disabled
    pub fn new_unsandboxed(root: PathBuf) -> Self {
        debug!(?root, "ToolContext::new_unsandboxed: called");
        Self {
            root,
            sandbox_enabled: false,
        }
    }

    /// Expand `~` and join relative paths onto the root
    fn normalize_path(&self, path: &Path) -> PathBuf {
        if let Ok(rest) = path.strip_prefix("~")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Resolve symlinks for the longest existing prefix and append the rest
    ///
    /// Fails if the non-existing remainder climbs with `..`, since it cannot
    /// be resolved safely.
    fn resolve(path: &Path) -> Option<PathBuf> {
        let mut existing = path;
        let mut rest = Vec::new();
        while !existing.exists() {
            rest.push(existing.file_name()?.to_os_string());
            existing = existing.parent()?;
        }

        let mut resolved = existing.canonicalize().ok()?;
        for part in rest.iter().rev() {
            if Path::new(part).components().any(|c| matches!(c, Component::ParentDir)) {
                return None;
            }
            resolved.push(part);
        }
        Some(resolved)
    }

    /// Validate a path and return its absolute form
    pub fn validate_path(&self, path: &Path) -> Result<PathBuf, ToolError> {
        debug!(?path, "ToolContext::validate_path: called");
        let normalized = self.normalize_path(path);

        if !self.sandbox_enabled {
            return Ok(normalized);
        }

        let violation = || ToolError::SandboxViolation {
            path: path.to_path_buf(),
            root: self.root.clone(),
        };

        let canonical = Self::resolve(&normalized).ok_or_else(violation)?;
        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());

        if canonical.starts_with(&root) {
            Ok(canonical)
        } else {
            debug!(?canonical, "ToolContext::validate_path: sandbox violation detected");
            Err(violation())
        }
    }
}
