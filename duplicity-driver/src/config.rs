//! Configuration for the driver binary.
//!
//! Loads a TOML file describing what to back up, where the duplicity
//! archive lives, and how the tool should be invoked.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backup: BackupConfig,

    #[serde(default)]
    pub duplicity: DuplicityConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Directory to back up
    pub source_dir: PathBuf,

    /// Directory holding the duplicity archive (addressed as file://)
    pub target_dir: PathBuf,

    /// Relative subdirectories to exclude, in emission order
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicityConfig {
    /// Binary to invoke
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Archive passphrase; unset keeps encryption off
    #[serde(default)]
    pub passphrase: Option<String>,

    /// Enable `--asynchronous-upload` (requires duplicity >= 0.6.23)
    #[serde(default)]
    pub asynchronous_upload: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_binary() -> String {
    "duplicity".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DuplicityConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            passphrase: None,
            asynchronous_upload: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
