//! # Vault Press
//!
//! A compiler for Obsidian-style Markdown vaults. Your filesystem is the data
//! source: every directory with a README becomes a published section, notes
//! become HTML fragments, and the whole page graph lands in one
//! `manifest.json` a single-page viewer can navigate without re-parsing
//! anything.
//!
//! # Architecture: Scan → Resolve → Emit
//!
//! One compile pass runs three stages over an in-memory graph:
//!
//! ```text
//! 1. Scan     vault/   →  VaultGraph     (filesystem → pages + directories + indices)
//! 2. Resolve  graph    →  graph          (raw link targets → vault-relative URLs / page ids)
//! 3. Emit     graph    →  MyVault_site/  (manifest.json + HTML fragments + assets)
//! ```
//!
//! The split exists because link resolution needs the *complete* graph:
//! a `[[wiki link]]` near the top of the first scanned file may point at the
//! last file scanned. So rendering records raw targets, and a second pass
//! rewrites them once every page and alias is known.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the vault, decides publishability, builds the page/directory graph |
//! | [`block`] | Line-oriented Markdown block parser: headings, lists, quotes, fences |
//! | [`inline`] | Inline Markdown → HTML: emphasis, code, math, wiki links and images |
//! | [`resolve`] | Deferred link resolution — rewrites raw targets in rendered HTML |
//! | [`emit`] | Manifest serialization and output-directory emission |
//! | [`config`] | Optional `config.toml` at the vault root |
//! | [`types`] | Graph types serialized into `manifest.json` (`Page`, `Directory`) |
//! | [`naming`] | Title humanization, tag stripping, POSIX relative paths |
//! | [`output`] | CLI output formatting — tree-based display of the built graph |
//!
//! # Design Decisions
//!
//! ## README-Gated Publishing
//!
//! A directory is published only when it contains a `README.md` (or
//! `README.html`), matched case-insensitively. This makes publishing an
//! explicit act: drop a README in a directory and it appears in the site,
//! delete it and the section vanishes — no config lists to maintain. Scanning
//! still descends through unpublished directories, so a deeply nested README
//! publishes its own subtree.
//!
//! ## One Manifest, Not Many Pages
//!
//! The output is HTML *fragments* plus one `manifest.json` holding every
//! page, directory, alias, and path index. A viewer loads the manifest once
//! and navigates client-side; nothing in the output needs a server to
//! assemble. Fragments stay inspectable on disk for debugging.
//!
//! ## Deferred Link Resolution
//!
//! Wiki links (`[[Note Title]]`), local Markdown links, and image embeds are
//! rendered with their raw targets first; [`resolve::resolve_page_links`]
//! rewrites them after the scan completes. Unresolvable targets are left
//! verbatim rather than erased — a broken link in the output is debuggable,
//! a silently dropped one is not.
//!
//! ## Hand-Rolled Markdown Engine
//!
//! Obsidian Markdown is not CommonMark: wiki links, `![[image embeds]]`,
//! `==highlights==`, `$$math$$`, and Excalidraw fences all need first-class
//! treatment, and the link sink must observe every target during rendering.
//! A line-oriented block parser ([`block`]) plus a staged regex inline pass
//! ([`inline`]) keeps all of that in one place, at the cost of skipping
//! CommonMark corners (setext headings, reference links) vaults don't use.

pub mod block;
pub mod config;
pub mod emit;
pub mod inline;
pub mod naming;
pub mod output;
pub mod resolve;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
