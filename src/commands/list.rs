//! Implementation of the `lessonbook list` command.

use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::lesson::{Lesson, discover};
use crate::markers::{MarkerKind, extract_markers};

/// Execute the `lessonbook list` command.
pub fn cmd_list() -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let config = ctx.load_config()?;

    let listing = list_lessons(&ctx, &config)?;
    if listing.is_empty() {
        println!("No lessons found in {}.", ctx.lessons_dir(&config).display());
        return Ok(());
    }

    let width = listing
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(0)
        .max("LESSON".len());

    print!("{:<width$}", "LESSON", width = width);
    for kind in MarkerKind::ALL {
        print!("  {:>5}", kind.to_string());
    }
    println!();

    for entry in &listing {
        print!("{:<width$}", entry.name, width = width);
        for count in entry.counts {
            print!("  {:>5}", count);
        }
        println!();
    }

    Ok(())
}

/// A discovered lesson and its marker counts, in substitution order.
#[derive(Debug, PartialEq, Eq)]
pub struct LessonListing {
    pub name: String,
    pub counts: [usize; 3],
}

/// Discover the project's lessons and count their markers.
pub fn list_lessons(ctx: &ProjectContext, config: &Config) -> Result<Vec<LessonListing>> {
    discover(&ctx.lessons_dir(config), &config.lesson_file)?
        .iter()
        .map(|dir| -> Result<LessonListing> {
            let lesson = Lesson::load(dir, &config.lesson_file)?;
            let counts = MarkerKind::ALL.map(|kind| extract_markers(kind, &lesson.text).len());
            Ok(LessonListing {
                name: lesson.name,
                counts,
            })
        })
        .collect()
}
