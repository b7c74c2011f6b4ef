//! Nix-style pretty printing of evaluated values.
//!
//! Mirrors the multi-line layout of `lib.generators.toPretty`: scalars
//! inline, one list element or attribute per line, two-space indentation,
//! `[ ]` and `{ }` for empty collections.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_'-]*$").expect("Invalid identifier regex")
});

const KEYWORDS: &[&str] = &[
    "assert", "else", "if", "in", "inherit", "let", "or", "rec", "then", "with",
];

/// Pretty-print a value the way Nix would show it to a reader.
pub fn pretty(value: &Value) -> String {
    render(value, "")
}

fn render(value: &Value, indent: &str) -> String {
    let intro = format!("\n{indent}  ");
    let outro = format!("\n{indent}");
    let inner = format!("{indent}  ");

    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => render_string(s, &intro, &outro),
        Value::Array(items) if items.is_empty() => "[ ]".to_string(),
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(|v| render(v, &inner)).collect();
            format!("[{intro}{}{outro}]", body.join(&intro))
        }
        Value::Object(attrs) if attrs.is_empty() => "{ }".to_string(),
        Value::Object(attrs) => {
            let body: Vec<String> = attrs
                .iter()
                .map(|(name, v)| format!("{} = {};", identifier(name), render(v, &inner)))
                .collect();
            format!("{{{intro}{}{outro}}}", body.join(&intro))
        }
    }
}

fn render_string(s: &str, intro: &str, outro: &str) -> String {
    let lines: Vec<&str> = s.split('\n').collect();
    if lines.len() == 1 {
        return quote(s);
    }

    let escaped: Vec<String> = lines
        .iter()
        .map(|line| line.replace("''", "'''").replace("${", "''${"))
        .collect();
    let (last, init) = match escaped.split_last() {
        Some(split) => split,
        None => return quote(s),
    };

    let tail = if last.is_empty() {
        outro.to_string()
    } else {
        format!("{intro}{last}")
    };
    format!("''{intro}{}{tail}''", init.join(intro))
}

fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("${", "\\${")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

fn identifier(name: &str) -> String {
    if IDENTIFIER.is_match(name) && !KEYWORDS.contains(&name) {
        name.to_string()
    } else {
        quote(name)
    }
}
