//! Directory traversal and snapshotting.
//!
//! Lesson directories are small, so both helpers read the whole tree eagerly.
//! Traversal order is deterministic: entries are sorted by file name within
//! each directory and visited depth-first.

use crate::error::{LessonError, Result};
use globset::GlobSet;
use std::fs;
use std::path::{Path, PathBuf};

/// All regular files under `root`, in deterministic depth-first order.
///
/// Symlinks are not followed.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_into(root, &mut files)?;
    Ok(files)
}

fn walk_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in sorted_entries(dir)? {
        let file_type = entry.file_type().map_err(|e| io_error("inspect", &entry.path(), e))?;
        if file_type.is_dir() {
            walk_into(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}

/// Copy the contents of `source` into `destination`.
///
/// Entries whose path relative to `source` matches `exclude` are skipped,
/// along with everything beneath them. Symlinks are copied as the files or
/// directories they point to.
pub fn copy_tree(source: &Path, destination: &Path, exclude: &GlobSet) -> Result<usize> {
    copy_into(source, source, destination, exclude)
}

fn copy_into(root: &Path, dir: &Path, destination: &Path, exclude: &GlobSet) -> Result<usize> {
    fs::create_dir_all(destination).map_err(|e| io_error("create", destination, e))?;

    let mut copied = 0;
    for entry in sorted_entries(dir)? {
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path.as_path());
        if exclude.is_match(relative) {
            continue;
        }

        let target = destination.join(entry.file_name());
        if path.is_dir() {
            copied += copy_into(root, &path, &target, exclude)?;
        } else if path.is_file() {
            fs::copy(&path, &target).map_err(|e| io_error("copy", &path, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| io_error("read directory", dir, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| io_error("read directory", dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> LessonError {
    LessonError::UserError(format!("failed to {} '{}': {}", action, path.display(), e))
}
