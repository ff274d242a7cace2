use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration from `.yarasentry.toml`.
///
/// Directory defaults match the container layout the scanner is meant to
/// run in: `yara_rules/` and `scan_files/` mounted under the working
/// directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_rules_dir")]
    pub rules_dir: PathBuf,
    #[serde(default = "default_scan_dir")]
    pub scan_dir: PathBuf,
}

fn default_rules_dir() -> PathBuf {
    PathBuf::from("yara_rules")
}

fn default_scan_dir() -> PathBuf {
    PathBuf::from("scan_files")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_dir: default_rules_dir(),
            scan_dir: default_scan_dir(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
