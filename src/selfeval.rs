//! Self-evaluation: rendering `self.<name>` markers.
//!
//! Every file under the lesson directory whose name starts with the
//! evaluation prefix is known by its file name with the extension stripped
//! (`eval-x.nix` becomes `eval-x`). Only the names a lesson references are
//! evaluated, each once.

use crate::embed::{fenced_block, strip_extension};
use crate::error::{LessonError, Result};
use crate::eval::Evaluator;
use crate::fs::walk_files;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Immutable mapping from evaluation-file name to its rendered value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationMap {
    /// Every evaluation name found in the lesson, referenced or not.
    names: Vec<String>,
    values: BTreeMap<String, String>,
}

impl EvaluationMap {
    /// Find the evaluation files under `lesson_dir` whose name starts with
    /// `prefix`, then evaluate the ones named in `referenced`.
    ///
    /// Files are visited in sorted path order. When two files strip to the
    /// same name, the first one wins and a warning is printed. Referenced
    /// names without a file are left out; [`substitute_self`] reports them.
    pub fn build<'r>(
        lesson_dir: &Path,
        prefix: &str,
        evaluator: &dyn Evaluator,
        referenced: impl IntoIterator<Item = &'r str>,
    ) -> Result<Self> {
        let sources = find_sources(lesson_dir, prefix)?;

        let mut values = BTreeMap::new();
        for name in referenced {
            if values.contains_key(name) {
                continue;
            }
            if let Some(path) = sources.get(name) {
                values.insert(name.to_string(), evaluator.evaluate_pretty(path, None)?);
            }
        }

        Ok(Self {
            names: sources.into_keys().collect(),
            values,
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Names that can be referenced by `self.<name>` markers.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn find_sources(lesson_dir: &Path, prefix: &str) -> Result<BTreeMap<String, PathBuf>> {
    let mut sources = BTreeMap::new();

    for path in walk_files(lesson_dir)? {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        if !name.starts_with(prefix) {
            continue;
        }

        let key = strip_extension(&name).to_string();
        if sources.contains_key(&key) {
            eprintln!(
                "Warning: ignoring '{}': evaluation name '{}' is already defined",
                path.display(),
                key
            );
            continue;
        }
        sources.insert(key, path);
    }

    Ok(sources)
}

/// Render `map[name]` as an unlabeled fenced block.
pub fn substitute_self(map: &EvaluationMap, name: &str) -> Result<String> {
    let value = map.get(name).ok_or_else(|| LessonError::MissingAttribute {
        name: name.to_string(),
        available: if map.names.is_empty() {
            "none".to_string()
        } else {
            map.names().collect::<Vec<_>>().join(", ")
        },
    })?;

    Ok(fenced_block("", value))
}
