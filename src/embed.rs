//! File embedding and fenced code block rendering.

use crate::error::{LessonError, Result};
use std::path::Path;

const FENCE: &str = "```";

/// Language tag for a file name.
///
/// Every dot-separated segment after the first is part of the extension, so
/// `archive.tar.xz` yields `tar.xz`. Names without a dot yield an empty tag.
pub fn file_extension(name: &str) -> String {
    let mut segments = name.split('.');
    segments.next();
    segments.collect::<Vec<_>>().join(".")
}

/// The part of a file name before its first dot.
pub fn strip_extension(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Render `content` as a fenced block with an optional info string.
///
/// One trailing newline of `content` is absorbed by the closing fence.
pub fn fenced_block(info: &str, content: &str) -> String {
    let body = content.strip_suffix('\n').unwrap_or(content);
    format!("{FENCE}{info}\n{body}\n{FENCE}")
}

/// Embed `base/relative` as a fenced block tagged with its extension and
/// titled with its file name.
pub fn embed(base: &Path, relative: &str) -> Result<String> {
    let path = base.join(relative);
    if !path.is_file() {
        return Err(LessonError::MissingFile(path.display().to_string()));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| {
        LessonError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tag = file_extension(&name);

    Ok(fenced_block(&format!("{} title=\"{}\"", tag, name), &content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("archive.tar.xz"), "tar.xz");
        assert_eq!(file_extension("run"), "");
        assert_eq!(file_extension("eval.nix"), "nix");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn test_file_extension_is_idempotent_on_bare_names() {
        let once = file_extension("Makefile");
        assert_eq!(once, "");
        assert_eq!(file_extension(&once), "");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("eval-x.nix"), "eval-x");
        assert_eq!(strip_extension("eval.tar.xz"), "eval");
        assert_eq!(strip_extension("eval"), "eval");
    }

    #[test]
    fn test_embed_nix_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("eval.nix"), "let a = 1; in a").unwrap();

        let block = embed(temp.path(), "eval.nix").unwrap();
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines[0], "```nix title=\"eval.nix\"");
        assert_eq!(lines[1], "let a = 1; in a");
        assert_eq!(lines[2], "```");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_embed_absorbs_one_trailing_newline() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.sh"), "echo hi\n").unwrap();

        let block = embed(temp.path(), "a.sh").unwrap();
        assert_eq!(block, "```sh title=\"a.sh\"\necho hi\n```");
    }

    #[test]
    fn test_embed_without_extension_has_empty_tag() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("run"), "x").unwrap();

        let block = embed(temp.path(), "run").unwrap();
        assert!(block.starts_with("``` title=\"run\"\n"));
    }

    #[test]
    fn test_embed_nested_path_uses_base_name_as_title() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/main.rs"), "fn main() {}").unwrap();

        let block = embed(temp.path(), "src/main.rs").unwrap();
        assert!(block.starts_with("```rs title=\"main.rs\"\n"));
    }

    #[test]
    fn test_embed_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = embed(temp.path(), "nope.nix").unwrap_err();
        assert!(matches!(err, LessonError::MissingFile(_)));
    }
}
