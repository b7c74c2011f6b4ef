//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a lessonbook project.
///
/// This struct represents the contents of `lessonbook.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Layout
    // =========================================================================
    /// Directory holding one sub-directory per lesson.
    #[serde(default = "default_lessons_dir")]
    pub lessons_dir: String,

    /// Output root; rendered lessons land in `<output_dir>/lessons/<name>/`.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Template file name inside each lesson directory.
    #[serde(default = "default_lesson_file")]
    pub lesson_file: String,

    /// Files whose name starts with this prefix feed `self.<name>` markers.
    #[serde(default = "default_eval_prefix")]
    pub eval_prefix: String,

    // =========================================================================
    // Collaborators
    // =========================================================================
    pub eval: EvalSettings,

    pub catalog: CatalogSettings,

    pub sandbox: SandboxSettings,

    // =========================================================================
    // Execution
    // =========================================================================
    /// Worker threads for rendering (defaults to available parallelism).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Whether to append render events to `.lessonbook/events.ndjson`.
    #[serde(default = "default_true")]
    pub events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lessons_dir: default_lessons_dir(),
            output_dir: default_output_dir(),
            lesson_file: default_lesson_file(),
            eval_prefix: default_eval_prefix(),
            eval: EvalSettings::default(),
            catalog: CatalogSettings::default(),
            sandbox: SandboxSettings::default(),
            jobs: None,
            events: default_true(),
        }
    }
}
