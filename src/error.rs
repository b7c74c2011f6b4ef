//! Error types for lessonbook.
//!
//! Uses thiserror for derive macros. Every variant carries enough context to
//! tell the author which file, attribute or script to fix.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for lesson rendering.
///
/// Errors are `Clone` so a failed sandbox run can be memoized and handed to
/// every requester of the same script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LessonError {
    /// User provided invalid arguments or the project is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// A file referenced by an embed marker or a run marker does not exist.
    #[error("file not found: {0}")]
    MissingFile(String),

    /// A `self.<name>` marker references a name with no evaluation file.
    #[error("attribute '{name}' not found in evaluation map (available: {available})")]
    MissingAttribute { name: String, available: String },

    /// `nix eval` was invoked in a run script without `-f`/`--file`.
    #[error("no file specified for `nix eval`: {0}")]
    NoFileSpecified(String),

    /// Shell arguments of a `nix eval` invocation could not be parsed.
    #[error("malformed arguments: {0}")]
    MalformedArguments(String),

    /// The evaluator failed to evaluate an expression file.
    #[error("evaluation failed: {0}")]
    EvalError(String),

    /// A required sandbox tool could not be located on the host.
    #[error("tool '{0}' not found on PATH")]
    ToolNotFound(String),

    /// A sandboxed script exited with a non-zero status.
    #[error("script exited with code {code}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    NonZeroExit {
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// Rendering a lesson failed at a specific marker.
    #[error("lesson '{lesson}' failed at marker '{reference}': {source}")]
    Lesson {
        lesson: String,
        reference: String,
        #[source]
        source: Box<LessonError>,
    },

    /// One or more lessons of a multi-lesson render failed.
    ///
    /// Carries the exit code of the first failure.
    #[error("{failed} of {total} lessons failed to render")]
    LessonsFailed {
        failed: usize,
        total: usize,
        exit_code: i32,
    },
}

impl LessonError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LessonError::UserError(_)
            | LessonError::MissingFile(_)
            | LessonError::MissingAttribute { .. } => exit_codes::USER_ERROR,
            LessonError::NoFileSpecified(_)
            | LessonError::MalformedArguments(_)
            | LessonError::EvalError(_) => exit_codes::EVAL_FAILURE,
            LessonError::ToolNotFound(_) | LessonError::NonZeroExit { .. } => {
                exit_codes::RUN_FAILURE
            }
            LessonError::Lesson { source, .. } => source.exit_code(),
            LessonError::LessonsFailed { exit_code, .. } => *exit_code,
        }
    }

    /// Attach the lesson name and marker reference to this error.
    pub fn in_lesson(self, lesson: &str, reference: &str) -> Self {
        match self {
            already @ LessonError::Lesson { .. } => already,
            other => LessonError::Lesson {
                lesson: lesson.to_string(),
                reference: reference.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias for lessonbook operations.
pub type Result<T> = std::result::Result<T, LessonError>;
