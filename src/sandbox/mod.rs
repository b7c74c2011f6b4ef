//! Sandboxed execution of rewritten run scripts.
//!
//! Each run gets a fresh [`Workspace`]: a copy of the lesson directory as the
//! working directory, a `bin/` holding only the configured tools, and a
//! cleared environment. Nix sees the configured experimental features and no
//! substituters, so only the local store is reachable. With network isolation
//! on, the shell runs inside `unshare --net`.
//!
//! The workspace is deleted on every exit path.

mod cache;
mod workspace;

pub use cache::CachedRunner;
pub use workspace::Workspace;

use crate::config::SandboxSettings;
use crate::embed::fenced_block;
use crate::error::{LessonError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs a rewritten script against a lesson directory and returns its
/// captured stdout as a fenced block.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, lesson_dir: &Path, script: &str) -> Result<String>;
}

/// The host-backed sandbox runner.
#[derive(Debug, Clone)]
pub struct SandboxRunner {
    shell: PathBuf,
    tools: Vec<(String, PathBuf)>,
    unshare: Option<PathBuf>,
    exclude: GlobSet,
    nix_config: String,
}

impl SandboxRunner {
    /// Resolve the shell and toolset on the host.
    ///
    /// Fails with `ToolNotFound` if any configured binary is missing, or if
    /// network isolation is requested and `unshare` is unavailable.
    pub fn new(settings: &SandboxSettings) -> Result<Self> {
        let shell = locate(&settings.shell)?;

        let tools = settings
            .tools
            .iter()
            .map(|name| Ok((name.clone(), locate(name)?)))
            .collect::<Result<Vec<_>>>()?;

        let unshare = if settings.isolate_network {
            Some(locate("unshare")?)
        } else {
            None
        };

        Ok(Self {
            shell,
            tools,
            unshare,
            exclude: build_globset(&settings.exclude)?,
            nix_config: nix_config(&settings.experimental_features),
        })
    }

    fn command(&self, workspace: &Workspace) -> Command {
        let mut command = match &self.unshare {
            Some(unshare) => {
                let mut c = Command::new(unshare);
                c.args(["--net", "--map-root-user", "--"]).arg(&self.shell);
                c
            }
            None => Command::new(&self.shell),
        };

        command
            .args(["-euo", "pipefail"])
            .arg(workspace.script_path())
            .current_dir(workspace.work_dir())
            .env_clear()
            .env("PATH", workspace.bin_dir())
            .env("HOME", workspace.home_dir())
            .env("TMPDIR", workspace.tmp_dir())
            .env("NIX_CONFIG", &self.nix_config)
            .env("LANG", "C.UTF-8")
            .stdin(Stdio::null());
        command
    }
}

impl ScriptRunner for SandboxRunner {
    fn run(&self, lesson_dir: &Path, script: &str) -> Result<String> {
        let workspace = Workspace::create(lesson_dir, &self.exclude, &self.tools, script)?;

        let output = self.command(&workspace).output().map_err(|e| {
            LessonError::UserError(format!(
                "failed to execute sandbox shell '{}': {}",
                self.shell.display(),
                e
            ))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            return Err(LessonError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        workspace.release()?;
        Ok(fence_output(&stdout))
    }
}

/// Frame captured stdout with bare fence lines.
pub fn fence_output(stdout: &str) -> String {
    if stdout.is_empty() {
        return "```\n```".to_string();
    }
    fenced_block("", stdout)
}

fn locate(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| LessonError::ToolNotFound(name.to_string()))
}

fn nix_config(features: &[String]) -> String {
    format!(
        "experimental-features = {}\nsubstituters =\nbuilders =\n",
        features.join(" ")
    )
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            continue;
        }
        builder.add(Glob::new(pattern).map_err(|e| {
            LessonError::UserError(format!("invalid sandbox exclude glob '{}': {}", pattern, e))
        })?);
    }
    builder
        .build()
        .map_err(|e| LessonError::UserError(format!("invalid sandbox exclude globs: {}", e)))
}
