//! Manifest serialization and output emission.
//!
//! The output directory is cleared and fully regenerated on every run — no
//! partial state is ever read back. Layout mirrors the vault:
//!
//! ```text
//! MyVault_site/
//! ├── manifest.json            # the whole page graph, pretty-printed
//! ├── README.html              # rendered fragment of the root README
//! ├── graphics/
//! │   └── logo.png             # assets copied verbatim
//! └── Projects/
//!     ├── README.html
//!     ├── compiler.html
//!     └── spec.pdf
//! ```
//!
//! `manifest.json` carries everything the SPA needs to navigate and render
//! without re-parsing: pages, directories, alias/path indices, and the
//! home/about entry points.

use crate::scan::VaultGraph;
use crate::types::{Directory, Page};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("output directory {0} overlaps the vault")]
    OutputOverlapsVault(PathBuf),
    #[error("pages {first} and {second} both emit to {dest}")]
    FragmentCollision {
        first: String,
        second: String,
        dest: PathBuf,
    },
}

/// Top-level manifest object, serialized once per build.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    generated_at: String,
    source_path: String,
    site_title: &'a str,
    home_page_id: &'a str,
    about_page_id: Option<&'a str>,
    pages: &'a BTreeMap<String, Page>,
    directories: &'a BTreeMap<String, Directory>,
    alias_index: &'a BTreeMap<String, String>,
    path_index: &'a BTreeMap<String, String>,
}

/// Summary of one emit pass, for CLI reporting.
#[derive(Debug)]
pub struct EmitReport {
    pub pages_written: usize,
    pub assets_copied: usize,
    pub manifest_path: PathBuf,
}

/// Serialize the graph to pretty-printed manifest JSON.
pub fn manifest_json(graph: &VaultGraph) -> Result<String, EmitError> {
    let manifest = Manifest {
        generated_at: Utc::now().to_rfc3339(),
        source_path: graph.source_root.display().to_string(),
        site_title: &graph.site_title,
        home_page_id: &graph.home_page_id,
        about_page_id: graph.about_page_id.as_deref(),
        pages: &graph.pages,
        directories: &graph.directories,
        alias_index: &graph.alias_index,
        path_index: &graph.path_index,
    };
    Ok(serde_json::to_string_pretty(&manifest)?)
}

/// Default output directory: `<vault-name><suffix>` beside the vault.
pub fn default_output_dir(vault: &Path, suffix: &str) -> PathBuf {
    let name = vault
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "vault".to_string());
    vault
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}{suffix}"))
}

/// Write the manifest, every page's HTML fragment, and all recorded assets.
///
/// The output directory is removed first so stale files from earlier builds
/// cannot survive.
pub fn emit(graph: &VaultGraph, output_dir: &Path) -> Result<EmitReport, EmitError> {
    if output_dir.exists() {
        let out = output_dir.canonicalize()?;
        if out == graph.source_root || graph.source_root.starts_with(&out) {
            return Err(EmitError::OutputOverlapsVault(output_dir.to_path_buf()));
        }
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir)?;

    let manifest_path = output_dir.join("manifest.json");
    fs::write(&manifest_path, manifest_json(graph)?)?;

    // Swapping the source extension for .html can collide (guide.md vs
    // guide.html); refuse instead of silently clobbering one fragment.
    let mut claimed: BTreeMap<PathBuf, &str> = BTreeMap::new();
    let mut pages_written = 0;
    for page in graph.pages.values() {
        let fragment = Path::new(&page.rel_path).with_extension("html");
        if let Some(prior) = claimed.insert(fragment.clone(), &page.id) {
            return Err(EmitError::FragmentCollision {
                first: prior.to_string(),
                second: page.id.clone(),
                dest: fragment,
            });
        }
        let dest = output_dir.join(&fragment);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, &page.html)?;
        pages_written += 1;
    }

    let mut assets_copied = 0;
    for dir in graph.directories.values() {
        for asset in &dir.asset_paths {
            let src = graph.source_root.join(asset);
            let dest = output_dir.join(asset);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&src, &dest)?;
            assets_copied += 1;
        }
    }

    Ok(EmitReport {
        pages_written,
        assets_copied,
        manifest_path,
    })
}
