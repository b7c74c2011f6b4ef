//! Expression evaluation.
//!
//! The [`Evaluator`] trait is the seam between rendering and the Nix
//! evaluator. Values come back either as JSON or already rendered for a
//! reader. JSON cannot carry functions, paths or derivations, so the Nix
//! evaluator renders with `lib.generators.toPretty` itself; [`pretty`] is the
//! fallback for evaluators that only produce JSON.

pub mod pretty;

use crate::error::{LessonError, Result};
use crate::nix::run_nix;
use serde_json::Value;
use std::path::Path;

pub use pretty::pretty;

/// The environment used when evaluating expression files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalContext {
    /// Path (or search-path expression) of the nixpkgs used for evaluation.
    pub nixpkgs: String,
    /// System identifier, e.g. `x86_64-linux`.
    pub system: String,
    /// Placeholder in `--apply` expressions that stands for `nixpkgs`.
    pub placeholder: String,
    /// Experimental features enabled for every `nix` invocation.
    pub experimental_features: Vec<String>,
}

impl EvalContext {
    /// Replace the nixpkgs placeholder in `expr` with the real path.
    pub fn resolve_placeholder(&self, expr: &str) -> String {
        if self.placeholder.is_empty() {
            return expr.to_string();
        }
        expr.replace(&self.placeholder, &self.nixpkgs)
    }

    /// Expression that imports nixpkgs for the configured system.
    pub fn pkgs_expr(&self) -> String {
        format!("import {} {{ system = \"{}\"; }}", self.nixpkgs, self.system)
    }

    /// Search-path expression for the nixpkgs library.
    ///
    /// A nixpkgs given as a plain path is reachable as `<nixpkgs>` through `-I`.
    fn lib_expr(&self) -> String {
        match self.nixpkgs.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            Some(name) => format!("<{}/lib>", name),
            None => "<nixpkgs/lib>".to_string(),
        }
    }

    /// `--apply` expression rendering a value with `lib.generators.toPretty`,
    /// after `apply` when one is given.
    pub fn pretty_apply(&self, apply: Option<&str>) -> String {
        let to_pretty = format!("(import {}).generators.toPretty {{ }}", self.lib_expr());
        match apply {
            Some(expr) => format!("value: {} (({}) value)", to_pretty, expr),
            None => to_pretty,
        }
    }
}

/// Evaluates expression files.
pub trait Evaluator: Send + Sync {
    /// Evaluate `file` to JSON, optionally piping the value through `apply`.
    fn evaluate(&self, file: &Path, apply: Option<&str>) -> Result<Value>;

    /// Evaluate `file` and render the value for a reader.
    ///
    /// Defaults to pretty-printing the JSON value.
    fn evaluate_pretty(&self, file: &Path, apply: Option<&str>) -> Result<String> {
        self.evaluate(file, apply).map(|value| pretty(&value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Pretty,
}

/// Evaluator backed by `nix eval`.
///
/// Files that are functions are auto-called with `pkgs` and `system`.
#[derive(Debug, Clone)]
pub struct NixEvaluator {
    ctx: EvalContext,
}

impl NixEvaluator {
    pub fn new(ctx: EvalContext) -> Self {
        Self { ctx }
    }

    fn args(&self, file: &Path, apply: Option<&str>, format: OutputFormat) -> Vec<String> {
        let mut args = vec![
            "eval".to_string(),
            match format {
                OutputFormat::Json => "--json",
                OutputFormat::Pretty => "--raw",
            }
            .to_string(),
            "--file".to_string(),
            file.display().to_string(),
        ];
        if !self.ctx.nixpkgs.starts_with('<') {
            args.push("-I".to_string());
            args.push(format!("nixpkgs={}", self.ctx.nixpkgs));
        }
        args.extend([
            "--argstr".to_string(),
            "system".to_string(),
            self.ctx.system.clone(),
            "--arg".to_string(),
            "pkgs".to_string(),
            self.ctx.pkgs_expr(),
        ]);

        let apply = match format {
            OutputFormat::Json => apply.map(str::to_string),
            OutputFormat::Pretty => Some(self.ctx.pretty_apply(apply)),
        };
        if let Some(expr) = apply {
            args.push("--apply".to_string());
            args.push(expr);
        }
        args
    }

    fn run(&self, file: &Path, apply: Option<&str>, format: OutputFormat) -> Result<String> {
        let args = self.args(file, apply, format);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Ok(run_nix(&self.ctx.experimental_features, &args)?.stdout)
    }
}

impl Evaluator for NixEvaluator {
    fn evaluate(&self, file: &Path, apply: Option<&str>) -> Result<Value> {
        let stdout = self.run(file, apply, OutputFormat::Json)?;

        serde_json::from_str(&stdout).map_err(|e| {
            LessonError::EvalError(format!(
                "nix eval produced invalid JSON for '{}': {}",
                file.display(),
                e
            ))
        })
    }

    fn evaluate_pretty(&self, file: &Path, apply: Option<&str>) -> Result<String> {
        self.run(file, apply, OutputFormat::Pretty)
    }
}
