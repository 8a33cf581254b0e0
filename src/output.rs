//! CLI output formatting.
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! ```text
//! Notes (MyVault)
//! Home: README.md
//! About: about.md
//!
//! . (2 pages)
//!     Projects/ (1 page)
//! graphics/ (1 asset)
//!
//! 5 pages, 3 directories, 12 aliases
//! ```

use crate::emit::EmitReport;
use crate::scan::VaultGraph;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn count_line(n: usize, singular: &str) -> String {
    if n == 1 {
        format!("1 {singular}")
    } else {
        format!("{n} {}", plural(singular))
    }
}

fn plural(singular: &str) -> String {
    match singular {
        "directory" => "directories".to_string(),
        "alias" => "aliases".to_string(),
        other => format!("{other}s"),
    }
}

/// Format the built graph as a directory tree plus summary counts.
pub fn format_graph_output(graph: &VaultGraph) -> Vec<String> {
    let mut lines = Vec::new();

    let vault_name = graph
        .source_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    lines.push(format!("{} ({})", graph.site_title, vault_name));
    lines.push(format!("Home: {}", graph.home_page_id));
    if let Some(about) = &graph.about_page_id {
        lines.push(format!("About: {about}"));
    }
    lines.push(String::new());

    format_directory(graph, ".", 0, &mut lines);

    // Nodes not reachable from the root tree (nested READMEs under
    // unpublished directories, graphics nodes) still get a line.
    let mut reachable = Vec::new();
    collect_reachable(graph, ".", &mut reachable);
    for (path, dir) in &graph.directories {
        if !reachable.contains(path) {
            lines.push(directory_line(path, dir.page_ids.len(), dir.asset_paths.len(), 0));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{}, {}, {}",
        count_line(graph.pages.len(), "page"),
        count_line(graph.directories.len(), "directory"),
        count_line(graph.alias_index.len(), "alias"),
    ));
    lines
}

fn directory_line(path: &str, pages: usize, assets: usize, depth: usize) -> String {
    let label = if path == "." {
        ".".to_string()
    } else {
        format!("{}/", path.rsplit('/').next().unwrap_or(path))
    };
    let detail = if assets > 0 && pages == 0 {
        count_line(assets, "asset")
    } else {
        count_line(pages, "page")
    };
    format!("{}{label} ({detail})", indent(depth))
}

fn format_directory(graph: &VaultGraph, path: &str, depth: usize, lines: &mut Vec<String>) {
    let Some(dir) = graph.directories.get(path) else {
        return;
    };
    // README counts as a page of its directory.
    let page_count = dir.page_ids.len() + usize::from(dir.readme_id.is_some());
    lines.push(directory_line(path, page_count, dir.asset_paths.len(), depth));
    for sub in &dir.subdirectories {
        format_directory(graph, sub, depth + 1, lines);
    }
}

fn collect_reachable(graph: &VaultGraph, path: &str, out: &mut Vec<String>) {
    out.push(path.to_string());
    if let Some(dir) = graph.directories.get(path) {
        for sub in &dir.subdirectories {
            collect_reachable(graph, sub, out);
        }
    }
}

/// Format the emit report summary.
pub fn format_emit_output(report: &EmitReport) -> Vec<String> {
    vec![
        format!(
            "Wrote {} and {}",
            count_line(report.pages_written, "page fragment"),
            count_line(report.assets_copied, "asset"),
        ),
        format!("Manifest: {}", report.manifest_path.display()),
    ]
}

pub fn print_graph_output(graph: &VaultGraph) {
    for line in format_graph_output(graph) {
        println!("{line}");
    }
}

pub fn print_emit_output(report: &EmitReport) {
    for line in format_emit_output(report) {
        println!("{line}");
    }
}
