//! Memoization of sandboxed runs.

use super::ScriptRunner;
use crate::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

type Slot = Arc<OnceLock<Result<String>>>;

/// Wraps a runner so each distinct (lesson directory, script) pair executes
/// at most once.
///
/// Concurrent requests for the same pair block until the first finishes and
/// then share its result. Failures are cached too: a failed script is never
/// retried within a build.
#[derive(Debug)]
pub struct CachedRunner<R> {
    inner: R,
    slots: Mutex<HashMap<(PathBuf, String), Slot>>,
}

impl<R: ScriptRunner> CachedRunner<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct runs requested so far.
    pub fn distinct_runs(&self) -> usize {
        self.slots.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: ScriptRunner> ScriptRunner for CachedRunner<R> {
    fn run(&self, lesson_dir: &Path, script: &str) -> Result<String> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
            slots
                .entry((lesson_dir.to_path_buf(), script.to_string()))
                .or_default()
                .clone()
        };

        slot.get_or_init(|| self.inner.run(lesson_dir, script))
            .clone()
    }
}
