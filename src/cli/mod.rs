//! CLI argument parsing for lessonbook.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lessonbook: render tutorial lessons from markdown templates.
///
/// A lesson is a directory holding `lesson.md` plus the files it refers to.
/// Whole-line markers in the template are replaced with:
/// - `[//]: # (./file)`: the file as a titled code block
/// - `[//]: # (self.name)`: the evaluated value of `name.*`
/// - `[//]: # (run script.sh)`: the output of the script run in a sandbox
#[derive(Parser, Debug)]
#[command(name = "lessonbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for lessonbook.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a lessonbook project in the current directory.
    ///
    /// Writes a default `lessonbook.yaml` (if missing) and creates the
    /// lessons directory.
    Init,

    /// Render lessons into the output directory.
    ///
    /// Renders every discovered lesson, or only the named ones. All lessons
    /// are attempted; the command fails if any of them failed.
    Render(RenderArgs),

    /// List discovered lessons with their marker counts.
    List,

    /// Print a lesson's run script after rewriting, without running it.
    Rewrite(RewriteArgs),
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Lessons to render (directory names); all lessons if omitted.
    pub lessons: Vec<String>,

    /// Output directory (overrides `output_dir` from the config).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of worker threads (overrides `jobs` from the config).
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Arguments for the `rewrite` command.
#[derive(Parser, Debug)]
pub struct RewriteArgs {
    /// Lesson directory name.
    pub lesson: String,

    /// Script path relative to the lesson directory.
    pub script: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
