//! Nix command runner for lessonbook.
//!
//! Provides a wrapper around the `nix` CLI with captured stdout/stderr and
//! structured error handling. Evaluation and package resolution go through
//! this module.

use crate::error::{LessonError, Result};
use std::process::{Command, Output};

/// Experimental features every `nix` invocation enables.
pub const DEFAULT_EXPERIMENTAL_FEATURES: &[&str] = &["nix-command", "flakes"];

/// Result of a successful nix command execution.
#[derive(Debug, Clone)]
pub struct NixOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl NixOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Run `nix` with the given arguments.
///
/// The experimental features are passed on the command line so the host
/// configuration does not need to enable them.
///
/// # Returns
///
/// * `Ok(NixOutput)` - On successful execution (exit code 0)
/// * `Err(LessonError::EvalError)` - On spawn failure or non-zero exit
pub fn run_nix(features: &[String], args: &[&str]) -> Result<NixOutput> {
    let mut command = Command::new("nix");
    if !features.is_empty() {
        command
            .arg("--extra-experimental-features")
            .arg(features.join(" "));
    }

    let output = command.args(args).output().map_err(|e| {
        LessonError::EvalError(format!(
            "failed to execute nix {}: {}\nFix: ensure nix is installed and in PATH.",
            args.first().unwrap_or(&""),
            e
        ))
    })?;

    let nix_output = NixOutput::from_output(&output);

    if output.status.success() {
        Ok(nix_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if nix_output.stderr.is_empty() {
            nix_output.stdout
        } else {
            nix_output.stderr
        };

        Err(LessonError::EvalError(format!(
            "nix {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}
