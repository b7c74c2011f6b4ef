//! Built-in rewrite rules.
//!
//! Rules are tried in table order. The order is the tie-break: a span
//! substituted by one rule is never seen by later rules.

use super::RewriteContext;
use super::invocation::EvalInvocation;
use crate::error::{LessonError, Result};
use regex::{Captures, Regex};

/// Produces the replacement text for a matched span.
pub type Transform = fn(&Captures<'_>, &RewriteContext<'_>) -> Result<String>;

/// One entry of the rewrite table.
pub struct RewriteRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub transform: Transform,
}

impl std::fmt::Debug for RewriteRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// The built-in table: package-run first, then evaluation.
pub fn builtin_rules(catalog_flake: &str) -> Result<Vec<RewriteRule>> {
    Ok(vec![package_run_rule(catalog_flake)?, evaluation_rule()?])
}

/// `nix run <flake>#<package> [--]` becomes the package's executable path.
///
/// The package name ends at the first character outside `[\w.+-]`, so shell
/// syntax directly after it (`;`, `)`, `&&`) is left in place.
pub fn package_run_rule(catalog_flake: &str) -> Result<RewriteRule> {
    let pattern = format!(
        r"nix\s+run\s+{}#(?P<package>[\w.+-]+)(?:\s+--(?P<tail>\s|$))?",
        regex::escape(catalog_flake)
    );
    Ok(RewriteRule {
        name: "package-run",
        pattern: compile(&pattern)?,
        transform: resolve_package,
    })
}

/// Arguments of one shell command: unquoted text up to a control operator,
/// redirection or parenthesis, with quoted strings and escapes taken whole.
const COMMAND_ARGS: &str = r#"(?:[^|;&<>()'"\\]|'[^']*'|"(?:[^"\\]|\\.)*"|\\.)*"#;

/// `nix eval <args>` up to the end of its shell command becomes an `echo` of
/// the value. The rest of the line is kept.
pub fn evaluation_rule() -> Result<RewriteRule> {
    Ok(RewriteRule {
        name: "evaluation",
        pattern: compile(&format!(r"nix\s+eval\b(?P<args>{})", COMMAND_ARGS))?,
        transform: evaluate_inline,
    })
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        LessonError::UserError(format!("invalid rewrite pattern '{}': {}", pattern, e))
    })
}

fn resolve_package(caps: &Captures<'_>, ctx: &RewriteContext<'_>) -> Result<String> {
    let package = &caps["package"];
    let tail = caps.name("tail").map_or("", |m| m.as_str());
    let executable = ctx.catalog.executable(package)?;
    Ok(format!("{}{}", executable.display(), tail))
}

fn evaluate_inline(caps: &Captures<'_>, ctx: &RewriteContext<'_>) -> Result<String> {
    let raw = &caps["args"];
    let trailing = &raw[raw.trim_end().len()..];
    let invocation = EvalInvocation::parse(raw)?;

    let path = ctx.lesson_dir.join(&invocation.file);
    if !path.is_file() {
        return Err(LessonError::MissingFile(path.display().to_string()));
    }

    let apply = invocation
        .apply
        .as_deref()
        .map(|expr| ctx.eval.resolve_placeholder(expr));
    let rendered = if invocation.json {
        let value = ctx.evaluator.evaluate(&path, apply.as_deref())?;
        serde_json::to_string(&value).map_err(|e| {
            LessonError::EvalError(format!("failed to encode '{}' as JSON: {}", path.display(), e))
        })?
    } else {
        ctx.evaluator.evaluate_pretty(&path, apply.as_deref())?
    };

    Ok(format!("echo {}{}", shell_words::quote(&rendered), trailing))
}
