//! Project context resolution for lessonbook.
//!
//! Finds the project root from any working directory and resolves the
//! paths every command works with. The project root is the nearest
//! ancestor holding `lessonbook.yaml`; when none exists, the working
//! directory itself is used so a bare `lessons/` tree renders with defaults.

use crate::config::{CONFIG_FILE, Config};
use crate::error::{LessonError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Directory (under the project root) holding lessonbook state.
pub const STATE_DIR: &str = ".lessonbook";

/// Resolved paths for a lessonbook project. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Absolute path to the project root.
    pub root: PathBuf,

    /// Whether `lessonbook.yaml` exists at the root.
    pub has_config: bool,
}

impl ProjectContext {
    /// Resolve the project context from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            LessonError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the project context from a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let cwd = cwd.as_ref();
        let cwd = if cwd.is_absolute() {
            cwd.to_path_buf()
        } else {
            env::current_dir()
                .map_err(|e| {
                    LessonError::UserError(format!(
                        "failed to get current working directory: {}",
                        e
                    ))
                })?
                .join(cwd)
        };

        match cwd.ancestors().find(|dir| dir.join(CONFIG_FILE).is_file()) {
            Some(root) => Ok(Self {
                root: root.to_path_buf(),
                has_config: true,
            }),
            None => Ok(Self {
                root: cwd,
                has_config: false,
            }),
        }
    }

    /// Load the project config, falling back to defaults without a config file.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(self.config_path())
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Get the path to the state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Get the path to the events log file.
    pub fn events_file(&self) -> PathBuf {
        self.state_dir().join("events.ndjson")
    }

    /// Directory holding the lesson sub-directories.
    pub fn lessons_dir(&self, config: &Config) -> PathBuf {
        self.root.join(&config.lessons_dir)
    }

    /// Output root, optionally overridden from the command line.
    pub fn output_dir(&self, config: &Config, override_dir: Option<&Path>) -> PathBuf {
        match override_dir {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => self.root.join(dir),
            None => self.root.join(&config.output_dir),
        }
    }
}
