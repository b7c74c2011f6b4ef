//! RAII sandbox workspace.

use crate::error::{LessonError, Result};
use crate::fs::copy_tree;
use globset::GlobSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An ephemeral directory tree for one sandboxed run.
///
/// Layout:
///
/// ```text
/// <root>/work/      snapshot of the lesson directory (working directory)
/// <root>/bin/       symlinks to the allowed tools (the only PATH entry)
/// <root>/home/      HOME
/// <root>/tmp/       TMPDIR
/// <root>/script.sh  the rewritten script
/// ```
///
/// When dropped, the whole tree is deleted. If deletion fails, a warning is
/// printed but no panic occurs.
#[derive(Debug)]
pub struct Workspace {
    root: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a workspace holding a snapshot of `lesson_dir` and `script`.
    pub fn create(
        lesson_dir: &Path,
        exclude: &GlobSet,
        tools: &[(String, PathBuf)],
        script: &str,
    ) -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("lessonbook-run-")
            .tempdir()
            .map_err(|e| {
                LessonError::UserError(format!("failed to create sandbox directory: {}", e))
            })?;
        let workspace = Self {
            path: root.path().to_path_buf(),
            root: Some(root),
        };

        for dir in [
            workspace.work_dir(),
            workspace.bin_dir(),
            workspace.home_dir(),
            workspace.tmp_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(|e| {
                LessonError::UserError(format!("failed to create '{}': {}", dir.display(), e))
            })?;
        }

        copy_tree(lesson_dir, &workspace.work_dir(), exclude)?;

        for (name, target) in tools {
            let link = workspace.bin_dir().join(name);
            std::os::unix::fs::symlink(target, &link).map_err(|e| {
                LessonError::UserError(format!(
                    "failed to link tool '{}' into sandbox: {}",
                    target.display(),
                    e
                ))
            })?;
        }

        fs::write(workspace.script_path(), script).map_err(|e| {
            LessonError::UserError(format!("failed to write sandbox script: {}", e))
        })?;

        Ok(workspace)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.path.join("work")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.path.join("bin")
    }

    pub fn home_dir(&self) -> PathBuf {
        self.path.join("home")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.path.join("tmp")
    }

    pub fn script_path(&self) -> PathBuf {
        self.path.join("script.sh")
    }

    /// Delete the workspace now, reporting failures to the caller.
    pub fn release(mut self) -> Result<()> {
        match self.root.take() {
            Some(root) => root.close().map_err(|e| {
                LessonError::UserError(format!(
                    "failed to remove sandbox '{}': {}",
                    self.path.display(),
                    e
                ))
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(root) = self.root.take()
            && let Err(e) = root.close()
        {
            eprintln!(
                "Warning: failed to remove sandbox '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}
