//! Implementation of the `lessonbook rewrite` command.
//!
//! Prints a run script as it would be handed to the sandbox. Evaluations in
//! the script still happen (their results are inlined); nothing is run.

use super::NixServices;
use crate::cli::RewriteArgs;
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{LessonError, Result};
use crate::lesson::{discover, select};
use crate::rewrite::RewriteContext;
use std::fs;
use std::path::PathBuf;

/// Execute the `lessonbook rewrite` command.
pub fn cmd_rewrite(args: RewriteArgs) -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let config = ctx.load_config()?;
    let services = NixServices::from_config(&config)?;

    let (lesson_dir, source) = load_script(&ctx, &config, &args.lesson, &args.script)?;
    let rewrite_ctx = RewriteContext {
        lesson_dir: &lesson_dir,
        eval: &services.eval,
        evaluator: &services.evaluator,
        catalog: &services.catalog,
    };
    let rewritten = services.rewriter.rewrite(&source, &rewrite_ctx)?;

    print!("{}", rewritten);
    if !rewritten.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Find `lesson` and read `script` from its directory.
///
/// Returns the lesson directory and the script source.
pub fn load_script(
    ctx: &ProjectContext,
    config: &Config,
    lesson: &str,
    script: &str,
) -> Result<(PathBuf, String)> {
    let lessons = discover(&ctx.lessons_dir(config), &config.lesson_file)?;
    let lesson_dir = select(lessons, &[lesson.to_string()])?
        .into_iter()
        .next()
        .ok_or_else(|| LessonError::UserError(format!("unknown lesson '{}'", lesson)))?;

    let script_path = lesson_dir.join(script);
    if !script_path.is_file() {
        return Err(LessonError::MissingFile(script_path.display().to_string()));
    }
    let source = fs::read_to_string(&script_path).map_err(|e| {
        LessonError::UserError(format!(
            "failed to read script '{}': {}",
            script_path.display(),
            e
        ))
    })?;

    Ok((lesson_dir, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::Rewriter;
    use crate::test_support::{FakeEvaluator, StaticCatalog, create_tree, eval_context};
    use serde_json::json;

    fn project(files: &[(&str, &str)]) -> (tempfile::TempDir, ProjectContext, Config) {
        let temp = create_tree(files);
        let ctx = ProjectContext::resolve_from(temp.path()).unwrap();
        let config = ctx.load_config().unwrap();
        (temp, ctx, config)
    }

    #[test]
    fn test_load_script_reads_from_lesson_dir() {
        let (temp, ctx, config) = project(&[
            ("lessonbook.yaml", ""),
            ("lessons/intro/lesson.md", ""),
            ("lessons/intro/scripts/run.sh", "echo hi\n"),
        ]);

        let (dir, source) = load_script(&ctx, &config, "intro", "scripts/run.sh").unwrap();

        assert_eq!(dir, temp.path().join("lessons/intro"));
        assert_eq!(source, "echo hi\n");
    }

    #[test]
    fn test_load_script_unknown_lesson() {
        let (_temp, ctx, config) = project(&[
            ("lessonbook.yaml", ""),
            ("lessons/intro/lesson.md", ""),
        ]);

        let err = load_script(&ctx, &config, "other", "run.sh").unwrap_err();
        assert!(matches!(err, LessonError::UserError(_)));
    }

    #[test]
    fn test_load_script_missing_script() {
        let (_temp, ctx, config) = project(&[
            ("lessonbook.yaml", ""),
            ("lessons/intro/lesson.md", ""),
        ]);

        let err = load_script(&ctx, &config, "intro", "run.sh").unwrap_err();
        assert!(matches!(err, LessonError::MissingFile(_)));
    }

    #[test]
    fn test_loaded_script_rewrites_against_lesson_dir() {
        let (_temp, ctx, config) = project(&[
            ("lessonbook.yaml", ""),
            ("lessons/intro/lesson.md", ""),
            ("lessons/intro/eval.nix", "3\n"),
            (
                "lessons/intro/run.sh",
                "nix run nixpkgs#jq -- .\nnix eval --json -f eval.nix\n",
            ),
        ]);
        let eval = eval_context();
        let evaluator = FakeEvaluator::new().with_file("eval.nix", json!(3));
        let catalog = StaticCatalog::new();
        let rewriter = Rewriter::new(&config.catalog.flake).unwrap();

        let (lesson_dir, source) = load_script(&ctx, &config, "intro", "run.sh").unwrap();
        let rewritten = rewriter
            .rewrite(
                &source,
                &RewriteContext {
                    lesson_dir: &lesson_dir,
                    eval: &eval,
                    evaluator: &evaluator,
                    catalog: &catalog,
                },
            )
            .unwrap();

        assert_eq!(rewritten, "/nix/store/fake-jq/bin/jq .\necho 3\n");
    }
}
