//! Implementation of the `lessonbook render` command.
//!
//! Discovers lessons, renders the selection in parallel on a rayon pool, and
//! writes each rendered lesson atomically. Every lesson is attempted; the
//! command fails afterwards if any lesson failed.

use super::NixServices;
use crate::cli::RenderArgs;
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{LessonError, Result};
use crate::events::{Event, EventAction, record};
use crate::lesson::{discover, select};
use crate::render::{LessonOutcome, RenderEnv, render_all};
use crate::sandbox::{CachedRunner, SandboxRunner};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Execute the `lessonbook render` command.
pub fn cmd_render(args: RenderArgs) -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let config = ctx.load_config()?;

    let services = NixServices::from_config(&config)?;
    let runner = CachedRunner::new(SandboxRunner::new(&config.sandbox)?);
    let output_root = ctx.output_dir(&config, args.output.as_deref());

    let env = RenderEnv {
        eval: &services.eval,
        evaluator: &services.evaluator,
        catalog: &services.catalog,
        runner: &runner,
        rewriter: &services.rewriter,
        eval_prefix: &config.eval_prefix,
        output_root: &output_root,
    };

    let jobs = args.jobs.or(config.jobs);
    let summary = render_project(&ctx, &config, &env, &args.lessons, jobs)?;
    if runner.distinct_runs() > 0 {
        println!("Sandboxed scripts run: {}", runner.distinct_runs());
    }
    summary.into_result()
}

/// Result of a multi-lesson render.
#[derive(Debug)]
pub struct RenderSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<(String, LessonError)>,
    pub total: usize,
}

impl RenderSummary {
    fn into_result(self) -> Result<()> {
        match self.failures.first() {
            None => Ok(()),
            Some((_, first)) => Err(LessonError::LessonsFailed {
                failed: self.failures.len(),
                total: self.total,
                exit_code: first.exit_code(),
            }),
        }
    }
}

/// Render the selected lessons of a project with the given collaborators.
pub fn render_project(
    ctx: &ProjectContext,
    config: &Config,
    env: &RenderEnv<'_>,
    names: &[String],
    jobs: Option<usize>,
) -> Result<RenderSummary> {
    let lessons_dir = ctx.lessons_dir(config);
    let dirs = select(discover(&lessons_dir, &config.lesson_file)?, names)?;
    if dirs.is_empty() {
        println!(
            "No lessons found in {} (looking for */{}).",
            lessons_dir.display(),
            config.lesson_file
        );
    }

    let outcomes = run_on_pool(jobs, || render_all(env, &dirs, &config.lesson_file))?;

    let mut summary = RenderSummary {
        written: Vec::new(),
        failures: Vec::new(),
        total: outcomes.len(),
    };

    for LessonOutcome { name, result } in outcomes {
        let written = result.and_then(|rendered| {
            rendered.write()?;
            Ok(rendered)
        });

        match written {
            Ok(rendered) => {
                println!(
                    "Rendered {} -> {}",
                    name,
                    display_relative(&ctx.root, &rendered.output_path)
                );
                if config.events {
                    let [embeds, selfs, runs] = rendered.marker_counts;
                    record(
                        ctx,
                        &Event::new(EventAction::Render)
                            .with_lesson(&name)
                            .with_details(json!({
                                "output": rendered.output_path.display().to_string(),
                                "markers": { "embed": embeds, "self": selfs, "run": runs },
                            })),
                    );
                }
                summary.written.push(rendered.output_path);
            }
            Err(err) => {
                eprintln!("Failed   {}: {}", name, err);
                if config.events {
                    record(
                        ctx,
                        &Event::new(EventAction::RenderFailed)
                            .with_lesson(&name)
                            .with_details(json!({
                                "error": err.to_string(),
                                "exit_code": err.exit_code(),
                            })),
                    );
                }
                summary.failures.push((name, err));
            }
        }
    }

    println!();
    println!(
        "{} of {} lessons rendered.",
        summary.written.len(),
        summary.total
    );
    Ok(summary)
}

/// Run `work` on a dedicated pool of `jobs` threads, or on the global pool.
fn run_on_pool<T, F>(jobs: Option<usize>, work: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match jobs {
        Some(0) => Err(LessonError::UserError(
            "--jobs must be greater than 0".to_string(),
        )),
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| {
                    LessonError::UserError(format!("failed to start worker pool: {}", e))
                })?;
            Ok(pool.install(work))
        }
        None => Ok(work()),
    }
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
