//! Configuration sections and defaults for lessonbook.

use crate::nix::DEFAULT_EXPERIMENTAL_FEATURES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings for evaluating expression files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalSettings {
    /// nixpkgs path used for `pkgs`; `<nixpkgs>` uses the host search path.
    pub nixpkgs: String,

    /// System identifier passed to evaluated files.
    pub system: String,

    /// Placeholder in `--apply` expressions replaced with `nixpkgs`.
    pub placeholder: String,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            nixpkgs: default_nixpkgs(),
            system: host_system(),
            placeholder: default_nixpkgs(),
        }
    }
}

/// Settings for the package catalog used by `nix run <flake>#<pkg>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Flake reference whose packages scripts may run.
    pub flake: String,

    /// Fixed executable paths that bypass resolution.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, PathBuf>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            flake: "nixpkgs".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Settings for sandboxed script execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Shell that runs the rewritten script.
    pub shell: String,

    /// Binaries exposed on the sandbox PATH.
    pub tools: Vec<String>,

    /// Nix experimental features enabled inside the sandbox.
    pub experimental_features: Vec<String>,

    /// Run the script without network access (`unshare --net`).
    pub isolate_network: bool,

    /// Globs (relative to the lesson directory) not copied into the sandbox.
    pub exclude: Vec<String>,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
            tools: vec!["nix".to_string(), "jq".to_string()],
            experimental_features: default_experimental_features(),
            isolate_network: true,
            exclude: vec!["result".to_string(), "result-*".to_string()],
        }
    }
}

/// Nix `system` string for the host, e.g. `x86_64-linux`.
pub fn host_system() -> String {
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };
    format!("{}-{}", std::env::consts::ARCH, os)
}

pub fn default_experimental_features() -> Vec<String> {
    DEFAULT_EXPERIMENTAL_FEATURES
        .iter()
        .map(|f| f.to_string())
        .collect()
}

// Default value functions for serde
pub(crate) fn default_nixpkgs() -> String {
    "<nixpkgs>".to_string()
}
pub(crate) fn default_lessons_dir() -> String {
    "lessons".to_string()
}
pub(crate) fn default_output_dir() -> String {
    "out".to_string()
}
pub(crate) fn default_lesson_file() -> String {
    "lesson.md".to_string()
}
pub(crate) fn default_eval_prefix() -> String {
    "eval".to_string()
}
pub(crate) fn default_true() -> bool {
    true
}
