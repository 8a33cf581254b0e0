//! Site configuration.
//!
//! An optional `config.toml` at the vault root overrides stock defaults.
//! Config files are sparse — set only the values you want:
//!
//! ```toml
//! site_title = "My Garden"
//! output_suffix = "_published"
//! skip_dirs = ["templates", "archive"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Vault-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, also forced onto the root README page.
    pub site_title: String,
    /// Suffix appended to the vault name for the default output directory.
    pub output_suffix: String,
    /// Extra directory names excluded from scanning, on top of the built-in
    /// control list (`.git`, `.obsidian`, ...).
    pub skip_dirs: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "Notes".to_string(),
            output_suffix: "_site".to_string(),
            skip_dirs: Vec::new(),
        }
    }
}

/// Load the vault config, falling back to defaults when no `config.toml`
/// exists.
pub fn load_config(vault_root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = vault_root.join("config.toml");
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_config() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_title, "Notes");
        assert_eq!(config.output_suffix, "_site");
        assert!(config.skip_dirs.is_empty());
    }

    #[test]
    fn sparse_override() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "site_title = \"Garden\"").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_title, "Garden");
        assert_eq!(config.output_suffix, "_site");
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "site_titel = \"typo\"").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }
}
