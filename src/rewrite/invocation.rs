//! Parsing of `nix eval` arguments found in run scripts.

use crate::error::{LessonError, Result};

/// A parsed `nix eval` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalInvocation {
    /// Expression file, relative to the lesson directory.
    pub file: String,
    /// Transform expression applied to the loaded value.
    pub apply: Option<String>,
    /// Serialize as JSON instead of pretty-printing.
    pub json: bool,
}

impl EvalInvocation {
    /// Parse the raw argument text following `nix eval`.
    ///
    /// Quoting follows POSIX shell rules. Later flags override earlier ones.
    pub fn parse(raw: &str) -> Result<Self> {
        let args = shell_words::split(raw).map_err(|e| {
            LessonError::MalformedArguments(format!(
                "failed to parse `nix eval{}`: {}\nFix: check for unmatched quotes or invalid escape sequences.",
                raw, e
            ))
        })?;

        let mut file = None;
        let mut apply = None;
        let mut json = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-f" | "--file" => file = Some(flag_value(arg, iter.next(), raw)?),
                "--apply" => apply = Some(flag_value(arg, iter.next(), raw)?),
                "--json" => json = true,
                other => {
                    if let Some(value) = other.strip_prefix("--file=") {
                        file = Some(value.to_string());
                    } else if let Some(value) = other.strip_prefix("--apply=") {
                        apply = Some(value.to_string());
                    } else {
                        return Err(LessonError::MalformedArguments(format!(
                            "unsupported argument '{}' in `nix eval{}`\nSupported: -f/--file, --apply, --json",
                            other, raw
                        )));
                    }
                }
            }
        }

        let file = file.ok_or_else(|| {
            LessonError::NoFileSpecified(format!(
                "`nix eval{}`\nFix: pass the expression file with -f/--file.",
                raw.trim_end()
            ))
        })?;

        Ok(Self { file, apply, json })
    }
}

fn flag_value(flag: &str, value: Option<&String>, raw: &str) -> Result<String> {
    value.cloned().ok_or_else(|| {
        LessonError::MalformedArguments(format!(
            "flag '{}' expects a value in `nix eval{}`",
            flag, raw
        ))
    })
}
