//! Config loading, validation, and derived settings.

use super::model::Config;
use crate::error::{LessonError, Result};
use crate::eval::EvalContext;
use globset::Glob;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(LessonError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LessonError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path`, or use defaults if the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| LessonError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LessonError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lesson_file`, `eval_prefix` and `sandbox.shell` must be non-empty
    /// - `lesson_file` must be a plain file name
    /// - `sandbox.exclude` entries must be valid globs
    /// - `jobs` must be positive when set
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("lesson_file", &self.lesson_file),
            ("eval_prefix", &self.eval_prefix),
            ("sandbox.shell", &self.sandbox.shell),
            ("catalog.flake", &self.catalog.flake),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(LessonError::UserError(format!(
                    "config validation failed: {} must not be empty",
                    name
                )));
            }
        }

        if self.lesson_file.contains('/') {
            return Err(LessonError::UserError(format!(
                "config validation failed: lesson_file must be a file name, got '{}'",
                self.lesson_file
            )));
        }

        for pattern in &self.sandbox.exclude {
            Glob::new(pattern).map_err(|e| {
                LessonError::UserError(format!(
                    "config validation failed: invalid sandbox.exclude glob '{}': {}\n\
                     Fix: edit lessonbook.yaml and correct or remove this pattern.",
                    pattern, e
                ))
            })?;
        }

        if self.jobs == Some(0) {
            return Err(LessonError::UserError(
                "config validation failed: jobs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The evaluation context threaded into evaluation and rewriting.
    pub fn eval_context(&self) -> EvalContext {
        EvalContext {
            nixpkgs: self.eval.nixpkgs.clone(),
            system: self.eval.system.clone(),
            placeholder: self.eval.placeholder.clone(),
            experimental_features: self.sandbox.experimental_features.clone(),
        }
    }
}
