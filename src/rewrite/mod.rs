//! Command rewriting for run scripts.
//!
//! Run scripts are written for readers: they invoke catalog packages with
//! `nix run nixpkgs#<name>` and inspect expressions with `nix eval -f ...`.
//! Before a script runs in the sandbox each line is rewritten through an
//! ordered rule table:
//!
//! 1. `package-run`: `nix run <flake>#<package> [--]` becomes the absolute
//!    executable path of the package.
//! 2. `evaluation`: `nix eval <args>` (up to the end of its shell command) is
//!    evaluated now and replaced with `echo <value>`.
//!
//! Per line, each rule substitutes at most its first match, and only in text
//! that no earlier rule produced. Everything else passes through unchanged.

mod catalog;
mod invocation;
mod rules;

#[cfg(test)]
mod tests;

pub use catalog::{NixCatalog, PackageCatalog};
pub use invocation::EvalInvocation;
pub use rules::{RewriteRule, Transform, builtin_rules};

use crate::error::Result;
use crate::eval::{EvalContext, Evaluator};
use std::path::Path;

/// Collaborators a rewrite needs, passed explicitly.
#[derive(Clone, Copy)]
pub struct RewriteContext<'a> {
    /// Directory that relative `-f` paths are resolved against.
    pub lesson_dir: &'a Path,
    pub eval: &'a EvalContext,
    pub evaluator: &'a dyn Evaluator,
    pub catalog: &'a dyn PackageCatalog,
}

/// A run-script rewriter holding the ordered rule table.
#[derive(Debug)]
pub struct Rewriter {
    rules: Vec<RewriteRule>,
}

struct Segment {
    text: String,
    rewritten: bool,
}

impl Rewriter {
    /// Build the rewriter with the built-in rules for `catalog_flake`.
    pub fn new(catalog_flake: &str) -> Result<Self> {
        Ok(Self::with_rules(builtin_rules(catalog_flake)?))
    }

    fn with_rules(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// Rewrite every line of `script`. Line structure is preserved.
    pub fn rewrite(&self, script: &str, ctx: &RewriteContext<'_>) -> Result<String> {
        let lines = script
            .split('\n')
            .map(|line| self.rewrite_line(line, ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }

    fn rewrite_line(&self, line: &str, ctx: &RewriteContext<'_>) -> Result<String> {
        let mut segments = vec![Segment {
            text: line.to_string(),
            rewritten: false,
        }];

        for rule in &self.rules {
            let hit = segments
                .iter()
                .position(|s| !s.rewritten && rule.pattern.is_match(&s.text));
            let Some(index) = hit else {
                continue;
            };

            let segment = segments.remove(index);
            let Some(caps) = rule.pattern.captures(&segment.text) else {
                segments.insert(index, segment);
                continue;
            };
            let span = caps.get(0).map_or(0..0, |m| m.range());
            let replacement = (rule.transform)(&caps, ctx)?;

            let pieces = [
                (segment.text[..span.start].to_string(), false),
                (replacement, true),
                (segment.text[span.end..].to_string(), false),
            ];
            for (offset, (text, rewritten)) in pieces
                .into_iter()
                .filter(|(text, rewritten)| *rewritten || !text.is_empty())
                .enumerate()
            {
                segments.insert(index + offset, Segment { text, rewritten });
            }
        }

        Ok(segments.into_iter().map(|s| s.text).collect())
    }
}
