//! Shared test utilities for the vault-press test suite.
//!
//! Builds small vaults directly into temp directories so every test gets an
//! isolated tree it can mutate freely. Layout of [`sample_vault`]:
//!
//! ```text
//! vault/
//! ├── README.md                # root README → home page
//! ├── about.md                 # about page
//! ├── graphics/
//! │   └── logo.png
//! ├── Projects/
//! │   ├── README.md
//! │   ├── compiler.md          # wiki-links and a wiki-image
//! │   ├── graphics/
//! │   │   └── diagram.excalidraw
//! │   └── spec.pdf             # opaque asset
//! └── drafts/                  # no README → unpublished
//!     └── Ideas/
//!         └── README.md        # nested README, still published
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write a file, creating parent directories as needed.
pub fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Build the standard sample vault used across scan/resolve/emit tests.
pub fn sample_vault() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_file(
        root,
        "README.md",
        b"# Welcome\n\nStart with [[Compiler Notes]] or the [about page](about.md).\n",
    );
    write_file(
        root,
        "about.md",
        b"# About This Vault\n\nNotes on everything.\n",
    );
    write_file(root, "graphics/logo.png", b"\x89PNG fake image bytes");
    write_file(root, "Projects/README.md", b"# Projects\n\nWork in progress.\n");
    write_file(
        root,
        "Projects/compiler.md",
        b"## Compiler Notes\n\n![[diagram]]\n\nBack to [[home]].\n",
    );
    write_file(
        root,
        "Projects/graphics/diagram.excalidraw",
        br#"{"type": "excalidraw", "elements": []}"#,
    );
    write_file(root, "Projects/spec.pdf", b"%PDF-1.4 fake");
    write_file(root, "drafts/Ideas/README.md", b"# Ideas\n");

    tmp
}
