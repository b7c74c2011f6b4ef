//! Implementation of the `lessonbook init` command.
//!
//! Writes a default `lessonbook.yaml` and creates the lessons directory.
//! The command is idempotent: an existing config is left untouched.

use crate::config::{CONFIG_FILE, Config};
use crate::context::ProjectContext;
use crate::error::{LessonError, Result};
use crate::events::{Event, EventAction, record};
use crate::fs::atomic_write_file;
use serde_json::json;
use std::fs;
use std::path::Path;

/// Execute the `lessonbook init` command in the current directory.
pub fn cmd_init() -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| {
        LessonError::UserError(format!("failed to get current working directory: {}", e))
    })?;

    let report = init_project(&cwd)?;

    if report.config_created {
        println!("Created {}", CONFIG_FILE);
    } else {
        println!("Using existing {}", CONFIG_FILE);
    }
    if report.lessons_dir_created {
        println!("Created {}/", report.lessons_dir);
    }
    println!();
    println!(
        "Add a lesson as {}/<name>/lesson.md, then run `lessonbook render`.",
        report.lessons_dir
    );

    Ok(())
}

/// What `init_project` changed.
#[derive(Debug, PartialEq, Eq)]
pub struct InitReport {
    pub config_created: bool,
    pub lessons_dir_created: bool,
    pub lessons_dir: String,
}

/// Initialize a project rooted at `root`.
pub fn init_project(root: &Path) -> Result<InitReport> {
    let config_path = root.join(CONFIG_FILE);
    let config_created = !config_path.exists();

    let config = if config_created {
        let config = Config::default();
        atomic_write_file(&config_path, &config.to_yaml()?)?;
        config
    } else {
        Config::load(&config_path)?
    };

    let lessons_dir = root.join(&config.lessons_dir);
    let lessons_dir_created = !lessons_dir.exists();
    fs::create_dir_all(&lessons_dir).map_err(|e| {
        LessonError::UserError(format!(
            "failed to create lessons directory '{}': {}",
            lessons_dir.display(),
            e
        ))
    })?;

    let ctx = ProjectContext::resolve_from(root)?;
    if config.events {
        record(
            &ctx,
            &Event::new(EventAction::Init).with_details(json!({
                "config_created": config_created,
                "lessons_dir": config.lessons_dir,
            })),
        );
    }

    Ok(InitReport {
        config_created,
        lessons_dir_created,
        lessons_dir: config.lessons_dir,
    })
}
