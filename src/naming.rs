//! Name and path normalization shared across the pipeline.
//!
//! Filenames and directory names double as display titles when a document has
//! no heading of its own: `reading-list.md` → "Reading List". All manifest
//! paths use POSIX separators regardless of the host platform so the SPA can
//! treat them as opaque keys.

use std::path::Path;

/// Derive a human-readable title from a file stem or directory name.
///
/// Splits on dashes, underscores, and whitespace, capitalizes each word, and
/// joins with single spaces:
/// - `"reading-list"` → `"Reading List"`
/// - `"project_notes"` → `"Project Notes"`
/// - `"2024 review"` → `"2024 Review"`
///
/// Returns the input unchanged if it contains no words at all.
pub fn humanize_title(value: &str) -> String {
    let words: Vec<&str> = value
        .trim()
        .split(['-', '_', ' ', '\t'])
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return value.to_string();
    }
    words
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Strip HTML tags from rendered text, leaving only the visible content.
///
/// Used when a heading's rendered HTML (which may contain `<strong>`, links,
/// etc.) becomes a plain-text title.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Convert a path to a POSIX-style string (`/` separators on every platform).
pub fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute the relative POSIX path from `start` (a directory) to `target`.
///
/// Both arguments are vault-relative POSIX paths; `"."` or `""` means the
/// vault root. Mirrors `posixpath.relpath` semantics:
///
/// - `posix_relpath("graphics/a.png", ".")` → `"graphics/a.png"`
/// - `posix_relpath("graphics/a.png", "notes/deep")` → `"../../graphics/a.png"`
/// - `posix_relpath("notes/a.png", "notes")` → `"a.png"`
pub fn posix_relpath(target: &str, start: &str) -> String {
    let target_parts: Vec<&str> = target
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    let start_parts: Vec<&str> = start
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();

    let common = target_parts
        .iter()
        .zip(start_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..start_parts.len() {
        parts.push("..");
    }
    parts.extend(&target_parts[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_dashed_name() {
        assert_eq!(humanize_title("reading-list"), "Reading List");
    }

    #[test]
    fn humanize_underscored_name() {
        assert_eq!(humanize_title("project_notes"), "Project Notes");
    }

    #[test]
    fn humanize_mixed_separators() {
        assert_eq!(humanize_title("my_big-project plan"), "My Big Project Plan");
    }

    #[test]
    fn humanize_preserves_inner_case() {
        assert_eq!(humanize_title("SQL-cheatsheet"), "SQL Cheatsheet");
    }

    #[test]
    fn humanize_empty_returns_input() {
        assert_eq!(humanize_title("---"), "---");
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<strong>Bold</strong> title"), "Bold title");
    }

    #[test]
    fn strip_tags_passes_plain_text() {
        assert_eq!(strip_tags("no markup here"), "no markup here");
    }

    #[test]
    fn relpath_from_root() {
        assert_eq!(posix_relpath("graphics/a.png", "."), "graphics/a.png");
    }

    #[test]
    fn relpath_climbs_ancestors() {
        assert_eq!(
            posix_relpath("graphics/a.png", "notes/deep"),
            "../../graphics/a.png"
        );
    }

    #[test]
    fn relpath_sibling_file() {
        assert_eq!(posix_relpath("notes/a.png", "notes"), "a.png");
    }

    #[test]
    fn relpath_shared_prefix() {
        assert_eq!(
            posix_relpath("a/b/graphics/x.png", "a/b/c"),
            "../graphics/x.png"
        );
    }

    #[test]
    fn relpath_identical() {
        assert_eq!(posix_relpath("a/b", "a/b"), ".");
    }
}
