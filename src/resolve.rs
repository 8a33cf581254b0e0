//! Asset reference resolution against the vault tree.
//!
//! Obsidian lets a note reference an attachment by bare filename and finds
//! the file through ambient lookup: the note's own directory first, then
//! `graphics/` directories walking up the ancestor chain. [`resolve_reference`]
//! reimplements those rules with a containment check so no reference can
//! escape the vault root via `..` traversal or a symlink.
//!
//! Resolution is *deferred*: the block parser emits raw reference strings
//! into `src`/`href`/`data-*` attributes, and [`resolve_page_links`] rewrites
//! them once the whole page graph exists. This lets wiki-links land on pages
//! that appear later in traversal order, which eager per-file resolution
//! cannot do. A reference that resolves to nothing stays verbatim — a broken
//! link degrades the page, never the build.

use crate::inline::is_external_url;
use crate::naming::{posix_relpath, to_posix};
use crate::scan::VaultGraph;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Resolve a raw asset reference to a canonical file inside the vault.
///
/// `referencing_dir` is the absolute directory of the file containing the
/// reference. Resolution order:
///
/// 1. The reference as a path relative to `referencing_dir`. References
///    containing a separator that miss here fail outright — no ambient
///    search for multi-segment paths.
/// 2. (covered by 1 for bare names) the referencing directory itself.
/// 3. For extensionless references, retry with `.excalidraw` appended.
/// 4. `<ancestor>/graphics/<reference>` walking from `referencing_dir` up to
///    and including the vault root, with the `.excalidraw` retry at each
///    level.
///
/// Every candidate must exist, be a regular file, and canonicalize to a path
/// inside the vault root.
pub fn resolve_reference(
    vault_root: &Path,
    referencing_dir: &Path,
    raw: &str,
) -> Option<PathBuf> {
    let reference = raw.trim().replace('\\', "/");
    if reference.is_empty() {
        return None;
    }
    let root = vault_root.canonicalize().ok()?;

    if let Some(hit) = contained(&referencing_dir.join(&reference), &root) {
        return Some(hit);
    }
    if reference.contains('/') {
        return None;
    }

    let extensionless = !reference.contains('.');
    if extensionless
        && let Some(hit) = contained(
            &referencing_dir.join(format!("{reference}.excalidraw")),
            &root,
        )
    {
        return Some(hit);
    }

    let mut current = referencing_dir.to_path_buf();
    loop {
        let graphics = current.join("graphics");
        if let Some(hit) = contained(&graphics.join(&reference), &root) {
            return Some(hit);
        }
        if extensionless
            && let Some(hit) = contained(&graphics.join(format!("{reference}.excalidraw")), &root)
        {
            return Some(hit);
        }
        if current.canonicalize().ok()? == root {
            break;
        }
        current = current.parent()?.to_path_buf();
    }

    None
}

fn contained(candidate: &Path, root: &Path) -> Option<PathBuf> {
    let resolved = candidate.canonicalize().ok()?;
    (resolved.is_file() && resolved.starts_with(root)).then_some(resolved)
}

/// Rewrite every page's HTML now that the full graph exists.
///
/// - `<img src>` / excalidraw `data-source` / local-link `href` values are
///   resolved against the vault and re-relativized to the referencing page's
///   directory (POSIX separators).
/// - Wiki-link anchors gain a `data-page-id` attribute when their target
///   matches the alias or path index.
///
/// Unresolvable references are left untouched.
pub fn resolve_page_links(graph: &mut VaultGraph) {
    static RE_IMG_SRC: OnceLock<Regex> = OnceLock::new();
    static RE_EMBED_SOURCE: OnceLock<Regex> = OnceLock::new();
    static RE_LOCAL_HREF: OnceLock<Regex> = OnceLock::new();
    static RE_WIKI_ANCHOR: OnceLock<Regex> = OnceLock::new();

    let re_img = RE_IMG_SRC.get_or_init(|| Regex::new(r#"(<img[^>]*?src=")([^"]*)(")"#).unwrap());
    let re_embed = RE_EMBED_SOURCE.get_or_init(|| {
        Regex::new(r#"(<div class="excalidraw-embed" data-source=")([^"]*)(")"#).unwrap()
    });
    let re_local = RE_LOCAL_HREF
        .get_or_init(|| Regex::new(r#"(<a class="local-link" href=")([^"]*)(")"#).unwrap());
    let re_wiki = RE_WIKI_ANCHOR.get_or_init(|| {
        Regex::new(r##"<a class="wiki-link" href="#" data-target="([^"]*)""##).unwrap()
    });

    let ids: Vec<String> = graph.pages.keys().cloned().collect();
    for id in ids {
        let Some(page) = graph.pages.get(&id) else {
            continue;
        };
        let dir_path = page.dir_path.clone();
        let referencing_dir = if dir_path == "." {
            graph.source_root.clone()
        } else {
            graph.source_root.join(&dir_path)
        };

        let rewrite = |caps: &Captures| -> String {
            match rewrite_target(&graph.source_root, &referencing_dir, &dir_path, &caps[2]) {
                Some(resolved) => format!("{}{}{}", &caps[1], resolved, &caps[3]),
                None => caps[0].to_string(),
            }
        };

        let mut html = page.html.clone();
        html = re_img.replace_all(&html, rewrite).into_owned();
        html = re_embed.replace_all(&html, rewrite).into_owned();
        html = re_local.replace_all(&html, rewrite).into_owned();
        html = re_wiki
            .replace_all(&html, |caps: &Captures| {
                let raw = html_escape::decode_html_entities(&caps[1]).into_owned();
                let target_id = graph
                    .alias_index
                    .get(&raw.to_lowercase())
                    .or_else(|| graph.path_index.get(&raw));
                match target_id {
                    Some(pid) => format!(
                        "{} data-page-id=\"{}\"",
                        &caps[0],
                        html_escape::encode_double_quoted_attribute(pid)
                    ),
                    None => caps[0].to_string(),
                }
            })
            .into_owned();

        if let Some(page) = graph.pages.get_mut(&id) {
            page.html = html;
        }
    }
}

/// Resolve one escaped attribute value; returns the new escaped value, or
/// None to leave the original in place.
fn rewrite_target(
    vault_root: &Path,
    referencing_dir: &Path,
    dir_path: &str,
    escaped_value: &str,
) -> Option<String> {
    let raw = html_escape::decode_html_entities(escaped_value).into_owned();
    if raw.is_empty() || is_external_url(&raw) || raw.starts_with("data:") || raw.starts_with('#') {
        return None;
    }
    let resolved = resolve_reference(vault_root, referencing_dir, &raw)?;
    let root = vault_root.canonicalize().ok()?;
    let rel = resolved.strip_prefix(&root).ok()?;
    let relative = posix_relpath(&to_posix(rel), dir_path);
    Some(html_escape::encode_double_quoted_attribute(&relative).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn direct_relative_path() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("notes/graphics/pic.png"));
        let dir = tmp.path().join("notes/sub");
        fs::create_dir_all(&dir).unwrap();

        let hit = resolve_reference(tmp.path(), &dir, "../graphics/pic.png").unwrap();
        assert!(hit.ends_with("graphics/pic.png"));
    }

    #[test]
    fn bare_filename_in_same_directory() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("notes/pic.png"));

        let hit = resolve_reference(tmp.path(), &tmp.path().join("notes"), "pic.png").unwrap();
        assert!(hit.ends_with("notes/pic.png"));
    }

    #[test]
    fn multi_segment_miss_fails_without_ambient_search() {
        let tmp = TempDir::new().unwrap();
        // The file exists in an ancestor graphics dir, but the reference has
        // a separator, so the ambient walk must not run.
        touch(&tmp.path().join("graphics/sub/pic.png"));
        let dir = tmp.path().join("notes");
        fs::create_dir_all(&dir).unwrap();

        assert_eq!(resolve_reference(tmp.path(), &dir, "sub/pic.png"), None);
    }

    #[test]
    fn extensionless_gets_excalidraw_suffix() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("notes/diagram.excalidraw"));

        let hit = resolve_reference(tmp.path(), &tmp.path().join("notes"), "diagram").unwrap();
        assert!(hit.ends_with("diagram.excalidraw"));
    }

    #[test]
    fn ancestor_graphics_walk() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("graphics/diagram.excalidraw"));
        let deep = tmp.path().join("a/b");
        fs::create_dir_all(&deep).unwrap();

        let hit = resolve_reference(tmp.path(), &deep, "diagram").unwrap();
        assert!(hit.ends_with("graphics/diagram.excalidraw"));
    }

    #[test]
    fn nearest_graphics_wins() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("graphics/pic.png"));
        touch(&tmp.path().join("a/graphics/pic.png"));
        let dir = tmp.path().join("a/b");
        fs::create_dir_all(&dir).unwrap();

        let hit = resolve_reference(tmp.path(), &dir, "pic.png").unwrap();
        assert!(hit.ends_with("a/graphics/pic.png"));
    }

    #[test]
    fn traversal_cannot_escape_vault() {
        let outer = TempDir::new().unwrap();
        touch(&outer.path().join("secret.txt"));
        let vault = outer.path().join("vault");
        let dir = vault.join("notes");
        fs::create_dir_all(&dir).unwrap();

        assert_eq!(resolve_reference(&vault, &dir, "../../secret.txt"), None);
    }

    #[test]
    fn missing_reference_is_none() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("notes");
        fs::create_dir_all(&dir).unwrap();

        assert_eq!(resolve_reference(tmp.path(), &dir, "nope.png"), None);
    }

    #[test]
    fn directories_are_not_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("notes/pic.png")).unwrap();

        assert_eq!(
            resolve_reference(tmp.path(), &tmp.path().join("notes"), "pic.png"),
            None
        );
    }

    mod page_links {
        use super::*;
        use crate::config::SiteConfig;
        use crate::scan::{VaultGraph, scan};
        use crate::test_helpers::sample_vault;

        fn resolved_graph(vault: &Path) -> VaultGraph {
            let mut graph = scan(vault, &SiteConfig::default()).unwrap();
            resolve_page_links(&mut graph);
            graph
        }

        #[test]
        fn image_embed_rewritten_to_graphics_path() {
            let vault = sample_vault();
            let graph = resolved_graph(vault.path());

            // ![[diagram]] in Projects/compiler.md finds the file in the
            // sibling graphics directory.
            let html = &graph.pages["Projects/compiler.md"].html;
            assert!(
                html.contains("src=\"graphics/diagram.excalidraw\""),
                "got: {html}"
            );
        }

        #[test]
        fn wiki_anchor_gains_page_id() {
            let vault = sample_vault();
            let graph = resolved_graph(vault.path());

            // [[Compiler Notes]] resolves forward to a page scanned later.
            let home = &graph.pages["README.md"].html;
            assert!(home.contains("data-page-id=\"Projects/compiler.md\""));

            // [[home]] resolves back to the root README by alias.
            let compiler = &graph.pages["Projects/compiler.md"].html;
            assert!(compiler.contains("data-page-id=\"README.md\""));
        }

        #[test]
        fn local_link_kept_relative_to_page_directory() {
            let vault = sample_vault();
            let graph = resolved_graph(vault.path());

            let home = &graph.pages["README.md"].html;
            assert!(home.contains("href=\"about.md\""));
        }

        #[test]
        fn unresolved_references_stay_verbatim() {
            let vault = sample_vault();
            crate::test_helpers::write_file(
                vault.path(),
                "dangling.md",
                b"# Dangling\n\n![missing](no/such.png) and [[Nowhere Page]]\n",
            );

            let graph = resolved_graph(vault.path());
            let html = &graph.pages["dangling.md"].html;
            assert!(html.contains("src=\"no/such.png\""));
            assert!(html.contains("data-target=\"Nowhere Page\""));
            assert!(!html.contains("data-page-id"));
        }
    }
}
