//! Lesson rendering.
//!
//! A lesson renders in three whole-line substitution passes, always in this
//! order: file embeds, self evaluations, run commands. Replacements are
//! computed from the raw template up front; a pass only ever replaces lines
//! of the original template, so text inserted by an earlier pass is never
//! re-examined. When a marker line occurs more than once, every occurrence
//! receives the replacement of the first.


use crate::embed::embed;
use crate::error::{LessonError, Result};
use crate::eval::{EvalContext, Evaluator};
use crate::fs::atomic_write_file;
use crate::lesson::Lesson;
use crate::markers::{Marker, MarkerKind, extract_markers};
use crate::rewrite::{PackageCatalog, RewriteContext, Rewriter};
use crate::sandbox::ScriptRunner;
use crate::selfeval::{EvaluationMap, substitute_self};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a render needs, passed explicitly.
pub struct RenderEnv<'a> {
    pub eval: &'a EvalContext,
    pub evaluator: &'a dyn Evaluator,
    pub catalog: &'a dyn PackageCatalog,
    pub runner: &'a dyn ScriptRunner,
    pub rewriter: &'a Rewriter,
    /// Prefix selecting evaluation files (`eval`).
    pub eval_prefix: &'a str,
    /// Output root; lessons land in `<output_root>/lessons/<name>/`.
    pub output_root: &'a Path,
}

/// The final document for one lesson and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLesson {
    pub name: String,
    pub output_dir: PathBuf,
    pub output_path: PathBuf,
    pub text: String,
    /// Marker counts in substitution order (embed, self, run).
    pub marker_counts: [usize; 3],
}

impl RenderedLesson {
    /// Write the document atomically, creating the output directory.
    pub fn write(&self) -> Result<()> {
        atomic_write_file(&self.output_path, &self.text)
    }
}

/// Outcome of rendering one lesson directory.
#[derive(Debug)]
pub struct LessonOutcome {
    pub name: String,
    pub result: Result<RenderedLesson>,
}

enum Line<'t> {
    Template(&'t str),
    Inserted(String),
}

/// Render a lesson to its final text. Nothing is written to disk.
pub fn render_lesson(env: &RenderEnv<'_>, lesson: &Lesson) -> Result<RenderedLesson> {
    let embeds = extract_markers(MarkerKind::FileEmbed, &lesson.text);
    let embed_replacements = embeds
        .iter()
        .map(|marker| {
            embed(&lesson.dir, &marker.reference)
                .map_err(|e| e.in_lesson(&lesson.name, &marker.reference))
        })
        .collect::<Result<Vec<_>>>()?;

    let selfs = extract_markers(MarkerKind::SelfEval, &lesson.text);
    let evaluation_map = EvaluationMap::build(
        &lesson.dir,
        env.eval_prefix,
        env.evaluator,
        selfs.iter().map(|marker| marker.reference.as_str()),
    )
    .map_err(|e| e.in_lesson(&lesson.name, &format!("{}*", env.eval_prefix)))?;
    let self_replacements = selfs
        .iter()
        .map(|marker| {
            substitute_self(&evaluation_map, &marker.reference)
                .map_err(|e| e.in_lesson(&lesson.name, &marker.reference))
        })
        .collect::<Result<Vec<_>>>()?;

    let runs = extract_markers(MarkerKind::RunCommand, &lesson.text);
    let run_replacements = runs
        .par_iter()
        .map(|marker| {
            run_marker(env, lesson, &marker.reference)
                .map_err(|e| e.in_lesson(&lesson.name, &marker.reference))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut lines: Vec<Line<'_>> = lesson.text.split('\n').map(Line::Template).collect();
    substitute(&mut lines, &embeds, embed_replacements);
    substitute(&mut lines, &selfs, self_replacements);
    substitute(&mut lines, &runs, run_replacements);

    let text = lines
        .into_iter()
        .map(|line| match line {
            Line::Template(raw) => raw.to_string(),
            Line::Inserted(text) => text,
        })
        .collect::<Vec<_>>()
        .join("\n");

    let output_dir = env.output_root.join("lessons").join(&lesson.name);
    Ok(RenderedLesson {
        name: lesson.name.clone(),
        output_path: output_dir.join(&lesson.file_name),
        output_dir,
        text,
        marker_counts: [embeds.len(), selfs.len(), runs.len()],
    })
}

/// Load and render every lesson directory in parallel, attempting all of them.
///
/// Outcomes are returned in input order.
pub fn render_all(env: &RenderEnv<'_>, dirs: &[PathBuf], file_name: &str) -> Vec<LessonOutcome> {
    dirs.par_iter()
        .map(|dir| {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| dir.display().to_string());
            let result = Lesson::load(dir, file_name)
                .map_err(|e| e.in_lesson(&name, file_name))
                .and_then(|lesson| render_lesson(env, &lesson));
            LessonOutcome { name, result }
        })
        .collect()
}

fn run_marker(env: &RenderEnv<'_>, lesson: &Lesson, reference: &str) -> Result<String> {
    let script_path = lesson.dir.join(reference);
    if !script_path.is_file() {
        return Err(LessonError::MissingFile(script_path.display().to_string()));
    }
    let script = fs::read_to_string(&script_path).map_err(|e| {
        LessonError::UserError(format!(
            "failed to read script '{}': {}",
            script_path.display(),
            e
        ))
    })?;

    let ctx = RewriteContext {
        lesson_dir: &lesson.dir,
        eval: env.eval,
        evaluator: env.evaluator,
        catalog: env.catalog,
    };
    let rewritten = env.rewriter.rewrite(&script, &ctx)?;
    env.runner.run(&lesson.dir, &rewritten)
}

/// Replace template lines equal to a marker line; the first marker with a
/// given line decides the replacement.
fn substitute(lines: &mut [Line<'_>], markers: &[Marker], replacements: Vec<String>) {
    let mut by_line: HashMap<&str, String> = HashMap::new();
    for (marker, replacement) in markers.iter().zip(replacements) {
        by_line.entry(marker.line.as_str()).or_insert(replacement);
    }
    if by_line.is_empty() {
        return;
    }

    for line in lines.iter_mut() {
        if let Line::Template(raw) = *line
            && let Some(replacement) = by_line.get(raw)
        {
            *line = Line::Inserted(replacement.clone());
        }
    }
}
