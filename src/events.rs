//! Event logging for lessonbook.
//!
//! Render runs are recorded as NDJSON (one JSON object per line) in
//! `.lessonbook/events.ndjson` under the project root.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The action performed (init, render, render_failed)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `lesson`: Optional lesson name for lesson-specific events
//! - `details`: Freeform object with action-specific details

use crate::context::ProjectContext;
use crate::error::{LessonError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Project initialization
    Init,
    /// Lesson rendered and written
    Render,
    /// Lesson failed to render
    RenderFailed,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::Render => write!(f, "render"),
            EventAction::RenderFailed => write!(f, "render_failed"),
        }
    }
}

/// An event record for the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Lesson name for lesson-specific events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action, stamped now.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            lesson: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_lesson(mut self, lesson: impl Into<String>) -> Self {
        self.lesson = Some(lesson.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            LessonError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the project's events log, creating it if needed.
pub fn append_event(ctx: &ProjectContext, event: &Event) -> Result<()> {
    let events_file = ctx.events_file();
    let json_line = event.to_ndjson_line()?;

    let state_dir = ctx.state_dir();
    if !state_dir.exists() {
        fs::create_dir_all(&state_dir).map_err(|e| {
            LessonError::UserError(format!(
                "failed to create state directory '{}': {}",
                state_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            LessonError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        LessonError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Append an event, downgrading failures to a warning.
///
/// The log is informational; a render that succeeded stays successful.
pub fn record(ctx: &ProjectContext, event: &Event) {
    if let Err(e) = append_event(ctx, event) {
        eprintln!("Warning: failed to record {} event: {}", event.action, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_project() -> (TempDir, ProjectContext) {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("lessonbook.yaml"), "").unwrap();
        let ctx = ProjectContext::resolve_from(temp_dir.path()).unwrap();
        (temp_dir, ctx)
    }

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::Init);

        assert_eq!(event.action, EventAction::Init);
        assert!(!event.actor.is_empty());
        assert!(event.lesson.is_none());
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_with_lesson_and_details() {
        let event = Event::new(EventAction::Render)
            .with_lesson("intro")
            .with_details(json!({"run_markers": 2}));

        assert_eq!(event.lesson, Some("intro".to_string()));
        assert_eq!(event.details["run_markers"], 2);
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new(EventAction::RenderFailed)
            .with_lesson("intro")
            .with_details(json!({"error": "boom"}));

        let json_line = event.to_ndjson_line().unwrap();
        assert!(!json_line.contains('\n'));
        assert!(json_line.contains("\"render_failed\""));

        let parsed: Event = serde_json::from_str(&json_line).unwrap();
        assert_eq!(parsed.action, EventAction::RenderFailed);
        assert_eq!(parsed.lesson, Some("intro".to_string()));
    }

    #[test]
    fn test_event_without_lesson_omits_field() {
        let json_line = Event::new(EventAction::Init).to_ndjson_line().unwrap();
        let parsed: Value = serde_json::from_str(&json_line).unwrap();
        assert!(parsed.get("lesson").is_none());
    }

    #[test]
    fn test_append_event_creates_file() {
        let (_temp_dir, ctx) = create_test_project();
        let events_file = ctx.events_file();
        assert!(!events_file.exists());

        append_event(&ctx, &Event::new(EventAction::Init)).unwrap();

        let content = fs::read_to_string(&events_file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        let parsed: Event = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.action, EventAction::Init);
    }

    #[test]
    fn test_append_event_multiple_lines() {
        let (_temp_dir, ctx) = create_test_project();

        append_event(&ctx, &Event::new(EventAction::Render).with_lesson("a")).unwrap();
        record(&ctx, &Event::new(EventAction::Render).with_lesson("b"));

        let content = fs::read_to_string(ctx.events_file()).unwrap();
        let lessons: Vec<String> = content
            .lines()
            .map(|line| serde_json::from_str::<Event>(line).unwrap())
            .filter_map(|event| event.lesson)
            .collect();
        assert_eq!(lessons, vec!["a", "b"]);
    }
}
