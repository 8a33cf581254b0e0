//! Shared types for the page/directory graph.
//!
//! These types are serialized into `manifest.json` and consumed by the SPA
//! without further parsing, so field names (camelCase) and the `type`
//! discriminator are part of the output contract.

use serde::Serialize;

/// What kind of renderable unit a [`Page`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    /// A directory's `README.md`, shown when the directory is opened.
    Readme,
    /// An ordinary Markdown note.
    Page,
    /// A directory's `README.html` — a pre-rendered HTML index.
    DirectoryIndex,
    /// An Excalidraw diagram file (`*.excalidraw` / `*.excalidraw.md`).
    Excalidraw,
}

/// Link references collected from a page, split by category.
///
/// The three lists are disjoint and keep document order. Targets are raw
/// source strings; the SPA (or the deferred resolution pass) maps them to
/// pages and files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageLinks {
    pub wiki: Vec<String>,
    pub local: Vec<String>,
    pub external: Vec<String>,
}

/// A single renderable unit of the vault.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Stable identity: the vault-relative POSIX path, case preserved.
    pub id: String,
    /// From the first H1/H2 heading, else humanized from the filename.
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PageKind,
    /// Vault-relative source path.
    pub rel_path: String,
    /// Vault-relative parent directory, `"."` for the root.
    pub dir_path: String,
    /// Rendered block HTML.
    pub html: String,
    /// Case-insensitive lookup strings (lowercased).
    pub aliases: Vec<String>,
    pub links: PageLinks,
    /// Raw Markdown source, kept for round-trip consumers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Parsed Excalidraw JSON payload, when the page is a diagram.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excalidraw_data: Option<serde_json::Value>,
}

/// A node in the navigable directory tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    /// Vault-relative path, `"."` for the root.
    pub path: String,
    /// Parent directory path, `None` for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Page id of this directory's README, `None` for `graphics` nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme_id: Option<String>,
    /// Published child directories, case-insensitive name order.
    pub subdirectories: Vec<String>,
    /// Child page ids, case-insensitive name order (after subdirectories).
    pub page_ids: Vec<String>,
    /// Non-Markdown, non-HTML files copied verbatim to the output.
    pub asset_paths: Vec<String>,
}
