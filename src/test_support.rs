use crate::error::{LessonError, Result};
use crate::eval::{EvalContext, Evaluator, pretty};
use crate::rewrite::PackageCatalog;
use crate::sandbox::ScriptRunner;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory is process-global; serialize tests that change it.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Create a directory tree from `(relative path, content)` pairs.
pub(crate) fn create_tree(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_tree(temp_dir.path(), files);
    temp_dir
}

pub(crate) fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}

pub(crate) fn eval_context() -> EvalContext {
    EvalContext {
        nixpkgs: "/nix/store/0000-nixpkgs-source".to_string(),
        system: "x86_64-linux".to_string(),
        placeholder: "<nixpkgs>".to_string(),
        experimental_features: vec!["nix-command".to_string(), "flakes".to_string()],
    }
}

/// Evaluator returning canned values keyed by file name.
///
/// An `apply` expression registered with [`FakeEvaluator::with_apply`]
/// replaces the file's value when that exact expression is passed. Text
/// registered with [`FakeEvaluator::with_rendered`] is what the evaluator
/// itself renders for a file, standing in for values JSON cannot carry.
#[derive(Default)]
pub(crate) struct FakeEvaluator {
    files: HashMap<String, Value>,
    applies: HashMap<String, Value>,
    rendered: HashMap<String, String>,
    calls: AtomicUsize,
    seen_applies: Mutex<Vec<String>>,
}

impl FakeEvaluator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(mut self, name: &str, value: Value) -> Self {
        self.files.insert(name.to_string(), value);
        self
    }

    pub(crate) fn with_apply(mut self, expr: &str, value: Value) -> Self {
        self.applies.insert(expr.to_string(), value);
        self
    }

    pub(crate) fn with_rendered(mut self, name: &str, text: &str) -> Self {
        self.rendered.insert(name.to_string(), text.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn seen_applies(&self) -> Vec<String> {
        self.seen_applies.lock().unwrap().clone()
    }
}

impl Evaluator for FakeEvaluator {
    fn evaluate(&self, file: &Path, apply: Option<&str>) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let value = self
            .files
            .get(&name)
            .cloned()
            .ok_or_else(|| LessonError::EvalError(format!("no canned value for '{}'", name)))?;

        match apply {
            Some(expr) => {
                self.seen_applies.lock().unwrap().push(expr.to_string());
                Ok(self.applies.get(expr).cloned().unwrap_or(value))
            }
            None => Ok(value),
        }
    }

    fn evaluate_pretty(&self, file: &Path, apply: Option<&str>) -> Result<String> {
        let value = self.evaluate(file, apply)?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(self
            .rendered
            .get(&name)
            .cloned()
            .unwrap_or_else(|| pretty(&value)))
    }
}

/// Catalog resolving every package to `/nix/store/fake-<name>/bin/<name>`.
#[derive(Default)]
pub(crate) struct StaticCatalog {
    calls: AtomicUsize,
}

impl StaticCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PackageCatalog for StaticCatalog {
    fn executable(&self, package: &str) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if package == "missing" {
            return Err(LessonError::EvalError(
                "attribute 'missing' not found".to_string(),
            ));
        }
        Ok(PathBuf::from(format!(
            "/nix/store/fake-{}/bin/{}",
            package, package
        )))
    }
}

/// Runner that echoes the script back inside a fence and counts executions.
#[derive(Default)]
pub(crate) struct EchoRunner {
    runs: AtomicUsize,
}

impl EchoRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl ScriptRunner for EchoRunner {
    fn run(&self, _lesson_dir: &Path, script: &str) -> Result<String> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if script.contains("exit 1") {
            return Err(LessonError::NonZeroExit {
                code: 1,
                stdout: String::new(),
                stderr: "failed".to_string(),
            });
        }
        Ok(format!("```\n{}\n```", script.trim_end()))
    }
}
