//! Vault scanning and page-graph construction.
//!
//! Recursively walks the vault, decides which directories are publishable,
//! and builds the Page/Directory graph plus alias and path indices that the
//! manifest serializes.
//!
//! ## Publishability
//!
//! A directory becomes a graph node only when it is the vault root, is named
//! `graphics`, or contains a README (`README.md`/`README.html`, matched
//! case-insensitively). A directory without a README is still scanned —
//! a README may exist deeper — but is neither a node nor linked from its
//! parent.
//!
//! ```text
//! vault/
//! ├── README.md            # root README → homePageId, title forced
//! ├── config.toml          # optional site config
//! ├── graphics/            # opaque assets, never scanned for pages
//! │   └── diagram.excalidraw
//! ├── Projects/
//! │   ├── README.md        # publishable
//! │   ├── compiler.md      # page
//! │   └── spec.pdf         # asset
//! └── drafts/              # no README → skipped, children still scanned
//!     └── Ideas/
//!         └── README.md    # publishable, node exists but unlinked
//! ```
//!
//! ## Determinism
//!
//! Children are visited in case-insensitive name order, directories before
//! files, so ids, indices, and the manifest are reproducible across runs.

use crate::block::parse_blocks;
use crate::config::SiteConfig;
use crate::naming::{humanize_title, strip_tags, to_posix};
use crate::types::{Directory, Page, PageKind, PageLinks};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("vault path not found or not a directory: {0}")]
    VaultNotFound(PathBuf),
    #[error("vault root must contain a README.md or README.html")]
    NoRootReadme,
}

/// Version-control and editor metadata directories, never scanned.
const CONTROL_DIRS: &[&str] = &[
    ".git",
    ".obsidian",
    ".idea",
    ".vscode",
    ".trash",
    "node_modules",
];

const GRAPHICS_DIR: &str = "graphics";

/// The complete page graph for one compile pass.
///
/// Built in a single traversal, consumed by the resolution pass and manifest
/// serialization, then discarded. `BTreeMap` keys give deterministic
/// serialization order for free.
#[derive(Debug)]
pub struct VaultGraph {
    /// Canonicalized vault root.
    pub source_root: PathBuf,
    pub site_title: String,
    pub pages: BTreeMap<String, Page>,
    pub directories: BTreeMap<String, Directory>,
    /// Lowercased alias → first-registered page id.
    pub alias_index: BTreeMap<String, String>,
    /// Vault-relative path → page id, including a directory-shorthand entry
    /// for README pages.
    pub path_index: BTreeMap<String, String>,
    pub home_page_id: String,
    pub about_page_id: Option<String>,
}

/// Scan the vault and build the full page graph.
pub fn scan(root: &Path, config: &SiteConfig) -> Result<VaultGraph, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::VaultNotFound(root.to_path_buf()));
    }
    let source_root = root.canonicalize()?;

    let mut builder = GraphBuilder {
        source_root: source_root.clone(),
        config,
        pages: BTreeMap::new(),
        directories: BTreeMap::new(),
        alias_index: BTreeMap::new(),
        path_index: BTreeMap::new(),
        home_page_id: None,
        about_page_id: None,
    };

    let published = builder.build_directory(&source_root, Path::new("."))?;
    let home_page_id = match (published, builder.home_page_id) {
        (true, Some(id)) => id,
        _ => return Err(ScanError::NoRootReadme),
    };

    Ok(VaultGraph {
        source_root,
        site_title: config.site_title.clone(),
        pages: builder.pages,
        directories: builder.directories,
        alias_index: builder.alias_index,
        path_index: builder.path_index,
        home_page_id,
        about_page_id: builder.about_page_id,
    })
}

struct GraphBuilder<'a> {
    source_root: PathBuf,
    config: &'a SiteConfig,
    pages: BTreeMap<String, Page>,
    directories: BTreeMap<String, Directory>,
    alias_index: BTreeMap<String, String>,
    path_index: BTreeMap<String, String>,
    home_page_id: Option<String>,
    about_page_id: Option<String>,
}

impl GraphBuilder<'_> {
    /// Process one directory. Returns whether it published (became a node
    /// eligible for linking from its parent).
    fn build_directory(&mut self, dir_abs: &Path, rel: &Path) -> Result<bool, ScanError> {
        let is_root = rel == Path::new(".");
        let dir_name = dir_abs
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if !is_root {
            if CONTROL_DIRS.contains(&dir_name.as_str())
                || self.config.skip_dirs.iter().any(|d| d == &dir_name)
            {
                return Ok(false);
            }
            if dir_name.eq_ignore_ascii_case(GRAPHICS_DIR) {
                self.build_graphics_node(dir_abs, rel)?;
                // The node exists but is not linked as a subdirectory —
                // its contents are reachable only as assets.
                return Ok(false);
            }
        }

        let (subdirs, files) = sorted_entries(dir_abs)?;

        let readme = files.iter().find(|f| {
            let lower = f.name.to_lowercase();
            lower == "readme.md" || lower == "readme.html"
        });

        let Some(readme) = readme else {
            if is_root {
                return Ok(false);
            }
            // Keep scanning: a README may exist deeper.
            for sub in &subdirs {
                self.build_directory(&sub.path, &join_rel(rel, &sub.name))?;
            }
            return Ok(false);
        };

        let dir_path = to_posix(rel);
        let parent = (!is_root).then(|| {
            let p = rel.parent().unwrap_or(Path::new(""));
            if p.as_os_str().is_empty() {
                ".".to_string()
            } else {
                to_posix(p)
            }
        });

        let readme_rel = join_rel(rel, &readme.name);
        let readme_id = self.make_page(&readme.path, &readme_rel, &dir_path, true)?;
        if let Some(id) = &readme_id {
            // Directory-shorthand entry: the directory path resolves to its
            // README page.
            self.path_index
                .entry(dir_path.clone())
                .or_insert_with(|| id.clone());
            if is_root {
                self.home_page_id = Some(id.clone());
            }
        }

        let mut subdirectories = Vec::new();
        let mut page_ids = Vec::new();
        let mut asset_paths = Vec::new();

        for sub in &subdirs {
            let child_rel = join_rel(rel, &sub.name);
            if self.build_directory(&sub.path, &child_rel)? {
                subdirectories.push(to_posix(&child_rel));
            }
        }

        for file in &files {
            if file.name.eq_ignore_ascii_case(&readme.name) {
                continue;
            }
            // The site config drives the build; it is not vault content.
            if is_root && file.name == "config.toml" {
                continue;
            }
            let file_rel = join_rel(rel, &file.name);
            let ext = Path::new(&file.name)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            match ext.as_str() {
                "md" | "excalidraw" | "html" | "htm" => {
                    match self.make_page(&file.path, &file_rel, &dir_path, false)? {
                        Some(id) => page_ids.push(id),
                        // Unreadable as UTF-8: degrade to an asset.
                        None => asset_paths.push(to_posix(&file_rel)),
                    }
                }
                _ => asset_paths.push(to_posix(&file_rel)),
            }
        }

        self.directories.insert(
            dir_path.clone(),
            Directory {
                path: dir_path,
                parent,
                readme_id,
                subdirectories,
                page_ids,
                asset_paths,
            },
        );

        Ok(true)
    }

    /// Register a `graphics` directory: every contained file becomes an
    /// opaque asset, nothing inside is ever a page.
    fn build_graphics_node(&mut self, dir_abs: &Path, rel: &Path) -> Result<(), ScanError> {
        let mut asset_paths = Vec::new();
        for entry in WalkDir::new(dir_abs).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() {
                let file_rel = rel.join(entry.path().strip_prefix(dir_abs).unwrap_or(entry.path()));
                asset_paths.push(to_posix(&file_rel));
            }
        }

        let dir_path = to_posix(rel);
        let parent = rel.parent().map(|p| {
            if p.as_os_str().is_empty() {
                ".".to_string()
            } else {
                to_posix(p)
            }
        });
        self.directories.insert(
            dir_path.clone(),
            Directory {
                path: dir_path,
                parent,
                readme_id: None,
                subdirectories: Vec::new(),
                page_ids: Vec::new(),
                asset_paths,
            },
        );
        Ok(())
    }

    /// Build and register a page from a Markdown, Excalidraw, or HTML file.
    ///
    /// Returns `None` when the file cannot be read as UTF-8 text — a
    /// recoverable condition; the caller records it as an asset instead.
    fn make_page(
        &mut self,
        file_abs: &Path,
        file_rel: &Path,
        dir_path: &str,
        is_readme: bool,
    ) -> Result<Option<String>, ScanError> {
        let Ok(text) = fs::read_to_string(file_abs) else {
            return Ok(None);
        };

        let file_name = file_rel
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let lower_name = file_name.to_lowercase();
        let is_html = lower_name.ends_with(".html") || lower_name.ends_with(".htm");
        let is_excalidraw =
            lower_name.ends_with(".excalidraw") || lower_name.ends_with(".excalidraw.md");
        let stem = page_stem(&file_name);
        let rel_path = to_posix(file_rel);
        let id = rel_path.clone();
        let is_root_readme = is_readme && dir_path == ".";

        let (html, inferred_title, links, markdown, excalidraw_data) = if is_html {
            let title = extract_html_title(&text);
            (text, title, PageLinks::default(), None, None)
        } else {
            let doc = parse_blocks(&text);
            let data = is_excalidraw.then(|| extract_excalidraw(&text)).flatten();
            let links = PageLinks {
                wiki: doc.links.wiki,
                local: doc.links.local,
                external: doc.links.external,
            };
            (doc.html, doc.title, links, Some(text), data)
        };

        let title = if is_root_readme {
            self.config.site_title.clone()
        } else {
            inferred_title.unwrap_or_else(|| humanize_title(&stem))
        };

        let kind = if is_readme {
            if is_html {
                PageKind::DirectoryIndex
            } else {
                PageKind::Readme
            }
        } else if is_excalidraw {
            PageKind::Excalidraw
        } else {
            PageKind::Page
        };

        let mut raw_aliases = vec![title.to_lowercase(), stem.to_lowercase(), lower_name];
        if is_readme {
            if is_root_readme {
                raw_aliases.push("home".to_string());
            } else if let Some(dir_name) = Path::new(dir_path).file_name() {
                raw_aliases.push(dir_name.to_string_lossy().to_lowercase());
            }
        }
        let mut aliases: Vec<String> = Vec::new();
        for alias in raw_aliases {
            if !alias.is_empty() && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }

        for alias in &aliases {
            self.alias_index
                .entry(alias.clone())
                .or_insert_with(|| id.clone());
        }
        self.path_index
            .entry(rel_path.clone())
            .or_insert_with(|| id.clone());

        if self.about_page_id.is_none() && is_about_page(&stem, &rel_path) {
            self.about_page_id = Some(id.clone());
        }

        self.pages.insert(
            id.clone(),
            Page {
                id: id.clone(),
                title,
                kind,
                rel_path,
                dir_path: dir_path.to_string(),
                html,
                aliases,
                links,
                markdown,
                excalidraw_data,
            },
        );

        Ok(Some(id))
    }
}

struct DirEntryInfo {
    name: String,
    path: PathBuf,
}

/// Join a child name onto a vault-relative path, keeping root children free
/// of a leading `./`.
fn join_rel(rel: &Path, name: &str) -> PathBuf {
    if rel == Path::new(".") {
        PathBuf::from(name)
    } else {
        rel.join(name)
    }
}

/// List a directory's children split into (subdirectories, files), each
/// sorted case-insensitively by name.
fn sorted_entries(dir: &Path) -> Result<(Vec<DirEntryInfo>, Vec<DirEntryInfo>), ScanError> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let info = DirEntryInfo {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path(),
        };
        if entry.file_type()?.is_dir() {
            subdirs.push(info);
        } else {
            files.push(info);
        }
    }
    subdirs.sort_by_key(|e| (e.name.to_lowercase(), e.name.clone()));
    files.sort_by_key(|e| (e.name.to_lowercase(), e.name.clone()));
    Ok((subdirs, files))
}

/// The display stem of a page file: filename minus `.md`, `.excalidraw`,
/// or `.excalidraw.md` (and `.html`/`.htm`).
fn page_stem(file_name: &str) -> String {
    let lower = file_name.to_lowercase();
    for suffix in [".excalidraw.md", ".excalidraw", ".html", ".htm", ".md"] {
        if lower.ends_with(suffix) {
            return file_name[..file_name.len() - suffix.len()].to_string();
        }
    }
    file_name.to_string()
}

/// A page is the "about" page when its stem or any path segment starts with
/// "about", case-insensitively. First match in traversal order wins.
fn is_about_page(stem: &str, rel_path: &str) -> bool {
    if stem.to_lowercase().starts_with("about") {
        return true;
    }
    rel_path
        .split('/')
        .any(|seg| seg.to_lowercase().starts_with("about"))
}

/// Infer a title from an HTML document: first `<h1>`, else `<title>`.
fn extract_html_title(html: &str) -> Option<String> {
    static RE_H1: OnceLock<Regex> = OnceLock::new();
    static RE_TITLE: OnceLock<Regex> = OnceLock::new();
    let re_h1 = RE_H1.get_or_init(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());
    let re_title = RE_TITLE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

    re_h1
        .captures(html)
        .or_else(|| re_title.captures(html))
        .map(|caps| strip_tags(&caps[1]).trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Extract an Excalidraw JSON payload from the first fenced code block
/// (optionally tagged `json`) whose content parses to an object containing
/// an `elements` or `type` key. Malformed blocks are skipped.
fn extract_excalidraw(text: &str) -> Option<serde_json::Value> {
    let mut in_block = false;
    let mut buffer: Vec<&str> = Vec::new();
    let mut blocks: Vec<String> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            if in_block {
                blocks.push(buffer.join("\n"));
                buffer.clear();
            }
            in_block = !in_block;
            continue;
        }
        if in_block {
            buffer.push(line);
        }
    }
    if in_block && !buffer.is_empty() {
        blocks.push(buffer.join("\n"));
    }

    for block in blocks {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&block)
            && (map.contains_key("elements") || map.contains_key("type"))
        {
            return Some(serde_json::Value::Object(map));
        }
    }
    None
}
