//! Lesson discovery and loading.
//!
//! A lesson is a directory under the lessons root that contains the template
//! file (default `lesson.md`). Its identity is the directory name.

use crate::error::{LessonError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A lesson template read from disk. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    /// Directory name, used as the lesson identity.
    pub name: String,
    /// Absolute lesson directory; relative references resolve against it.
    pub dir: PathBuf,
    /// Template file name inside `dir`.
    pub file_name: String,
    /// Raw template text.
    pub text: String,
}

impl Lesson {
    /// Read the template `file_name` from `dir`.
    pub fn load(dir: &Path, file_name: &str) -> Result<Self> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                LessonError::UserError(format!("invalid lesson directory '{}'", dir.display()))
            })?;

        let template = dir.join(file_name);
        if !template.is_file() {
            return Err(LessonError::MissingFile(template.display().to_string()));
        }
        let text = fs::read_to_string(&template).map_err(|e| {
            LessonError::UserError(format!(
                "failed to read lesson '{}': {}",
                template.display(),
                e
            ))
        })?;

        Ok(Self {
            name,
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
            text,
        })
    }
}

/// Find every sub-directory of `lessons_dir` holding `file_name`, sorted by name.
pub fn discover(lessons_dir: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(lessons_dir).map_err(|e| {
        LessonError::UserError(format!(
            "failed to read lessons directory '{}': {}\n\
             Run `lessonbook init` or set `lessons_dir` in lessonbook.yaml.",
            lessons_dir.display(),
            e
        ))
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            LessonError::UserError(format!(
                "failed to read entry in '{}': {}",
                lessons_dir.display(),
                e
            ))
        })?;
        let path = entry.path();
        if path.is_dir() && path.join(file_name).is_file() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Narrow `discovered` to the lessons named in `names` (all if empty).
///
/// Unknown names are an error listing what exists.
pub fn select(discovered: Vec<PathBuf>, names: &[String]) -> Result<Vec<PathBuf>> {
    if names.is_empty() {
        return Ok(discovered);
    }

    let name_of = |path: &PathBuf| {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    };

    let mut selected = Vec::new();
    for name in names {
        let found = discovered
            .iter()
            .find(|path| name_of(path) == *name)
            .ok_or_else(|| {
                let available: Vec<String> = discovered.iter().map(name_of).collect();
                LessonError::UserError(format!(
                    "unknown lesson '{}' (available: {})",
                    name,
                    if available.is_empty() {
                        "none".to_string()
                    } else {
                        available.join(", ")
                    }
                ))
            })?;
        if !selected.contains(found) {
            selected.push(found.clone());
        }
    }
    Ok(selected)
}
