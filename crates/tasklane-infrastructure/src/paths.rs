//! Unified path management for tasklane files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/tasklane/          # Config directory (platform default)
//! ├── config.toml              # Client configuration (API base URL, timeout)
//! └── session.toml             # Persisted session (credential + profile)
//! ```
//!
//! Every path can be re-rooted with an explicit base directory, which is
//! how tests and the `--data-dir` flag keep state out of the real home.

use std::path::{Path, PathBuf};

use tasklane_core::TasklaneError;

const APP_DIR: &str = "tasklane";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for TasklaneError {
    fn from(err: PathError) -> Self {
        TasklaneError::config(err.to_string())
    }
}

/// Path resolver for tasklane.
#[derive(Debug, Clone)]
pub struct TasklanePaths {
    base: Option<PathBuf>,
}

impl TasklanePaths {
    /// Creates a resolver.
    ///
    /// With `Some(base)`, every file lives directly under `base`; otherwise
    /// under the platform config directory (e.g. `~/.config/tasklane/`).
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the tasklane configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the persisted session file.
    ///
    /// # Security Note
    ///
    /// The file holds a bearer credential; it is written with mode 600 on unix.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.toml"))
    }
}

impl Default for TasklanePaths {
    fn default() -> Self {
        Self::new(None)
    }
}
