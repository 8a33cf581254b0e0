use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vault_press::{config, emit, output, resolve, scan};

#[derive(Parser)]
#[command(name = "vault-press")]
#[command(about = "Compile an Obsidian-style Markdown vault into a navigable site")]
#[command(long_about = "\
Compile an Obsidian-style Markdown vault into a navigable site

Your vault is the data source. Every directory with a README becomes a
section, Markdown notes become HTML fragments, and a single manifest.json
carries the whole page graph for the viewer.

Vault structure:

  MyVault/
  ├── README.md                # required at the root → home page
  ├── config.toml              # site config (optional)
  ├── about.md                 # picked up as the about page
  ├── graphics/                # opaque assets, referenced from notes
  │   └── diagram.excalidraw
  ├── Projects/
  │   ├── README.md            # makes Projects/ publishable
  │   ├── compiler.md          # [[wiki links]] resolved across the vault
  │   └── spec.pdf             # copied verbatim
  └── drafts/                  # no README = not published

Output (default: sibling directory MyVault_site/):
  manifest.json plus one HTML fragment per page, assets copied alongside.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → resolve links → emit
    Build {
        /// Vault directory
        vault: PathBuf,
        /// Output directory (default: <vault-name><output_suffix> beside the vault)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Scan the vault and print the manifest JSON to stdout
    Scan {
        /// Vault directory
        vault: PathBuf,
    },
    /// Validate the vault and print a summary without writing anything
    Check {
        /// Vault directory
        vault: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { vault, out } => {
            let site_config = config::load_config(&vault)?;
            let output_dir =
                out.unwrap_or_else(|| emit::default_output_dir(&vault, &site_config.output_suffix));

            println!("==> Scanning {}", vault.display());
            let mut graph = scan::scan(&vault, &site_config)?;
            output::print_graph_output(&graph);

            println!("==> Resolving links");
            resolve::resolve_page_links(&mut graph);

            println!("==> Emitting → {}", output_dir.display());
            let report = emit::emit(&graph, &output_dir)?;
            output::print_emit_output(&report);

            println!("==> Build complete: {}", output_dir.display());
        }
        Command::Scan { vault } => {
            let site_config = config::load_config(&vault)?;
            let mut graph = scan::scan(&vault, &site_config)?;
            resolve::resolve_page_links(&mut graph);
            println!("{}", emit::manifest_json(&graph)?);
        }
        Command::Check { vault } => {
            let site_config = config::load_config(&vault)?;
            println!("==> Checking {}", vault.display());
            let graph = scan::scan(&vault, &site_config)?;
            output::print_graph_output(&graph);
            println!("==> Vault is valid");
        }
    }

    Ok(())
}
