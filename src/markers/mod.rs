//! Marker extraction for lesson templates.
//!
//! A marker is a hidden markdown comment occupying an entire line:
//!
//! - `[//]: # (./<relative-path>)` embeds a file
//! - `[//]: # (self.<attribute-name>)` substitutes an evaluated expression
//! - `[//]: # (run <relative-script-path>)` substitutes captured script output
//!
//! Lines are matched in full. A line that merely contains a marker (for
//! example inside a sentence) is not a marker and passes through untouched.


use regex::Regex;
use std::sync::LazyLock;

static FILE_EMBED: LazyLock<LinePattern> = LazyLock::new(|| {
    LinePattern::new(r"\[//\]: # \(\./(.+)\)").expect("Invalid file embed marker regex")
});

static SELF_EVAL: LazyLock<LinePattern> = LazyLock::new(|| {
    LinePattern::new(r"\[//\]: # \(self\.([^()\s]+)\)").expect("Invalid self eval marker regex")
});

static RUN_COMMAND: LazyLock<LinePattern> = LazyLock::new(|| {
    LinePattern::new(r"\[//\]: # \(run (\S.*)\)").expect("Invalid run command marker regex")
});

/// A regex anchored at both ends so it can only match a whole line.
#[derive(Debug, Clone)]
pub struct LinePattern {
    regex: Regex,
}

impl LinePattern {
    /// Anchor `pattern` at both ends.
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { regex })
    }

    /// True if `line` matches the pattern in its entirety.
    pub fn is_full_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Capture group 1 of a full-line match.
    pub fn capture<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// The three kinds of substitution markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Embed a file as a titled fenced code block.
    FileEmbed,
    /// Substitute a value from the evaluation map.
    SelfEval,
    /// Substitute the captured output of a sandboxed script.
    RunCommand,
}

impl MarkerKind {
    /// All kinds, in substitution order.
    pub const ALL: [MarkerKind; 3] = [
        MarkerKind::FileEmbed,
        MarkerKind::SelfEval,
        MarkerKind::RunCommand,
    ];

    /// The whole-line pattern for this kind; group 1 captures the reference.
    pub fn pattern(self) -> &'static LinePattern {
        match self {
            MarkerKind::FileEmbed => &FILE_EMBED,
            MarkerKind::SelfEval => &SELF_EVAL,
            MarkerKind::RunCommand => &RUN_COMMAND,
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerKind::FileEmbed => write!(f, "embed"),
            MarkerKind::SelfEval => write!(f, "self"),
            MarkerKind::RunCommand => write!(f, "run"),
        }
    }
}

/// A marker line found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// The full raw line, used as the substitution key.
    pub line: String,
    /// The captured reference: relative path, attribute name or script path.
    pub reference: String,
}

/// Return every line of `text` that matches `pattern` in full, in order.
///
/// Duplicates are preserved.
pub fn extract<'a>(pattern: &LinePattern, text: &'a str) -> Vec<&'a str> {
    text.split('\n')
        .filter(|line| pattern.is_full_match(line))
        .collect()
}

/// Return capture group 1 of each line, in order.
///
/// Lines that do not match contribute nothing.
pub fn extract_references<'a>(pattern: &LinePattern, lines: &[&'a str]) -> Vec<&'a str> {
    lines
        .iter()
        .filter_map(|line| pattern.capture(line))
        .collect()
}

/// Extract the markers of one kind from `text`, in order of occurrence.
pub fn extract_markers(kind: MarkerKind, text: &str) -> Vec<Marker> {
    let pattern = kind.pattern();
    let lines = extract(pattern, text);
    let references = extract_references(pattern, &lines);

    lines
        .into_iter()
        .zip(references)
        .map(|(line, reference)| Marker {
            kind,
            line: line.to_string(),
            reference: reference.to_string(),
        })
        .collect()
}
