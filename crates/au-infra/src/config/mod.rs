//! # Configuration Loader
//!
//! Reads the uploader's TOML file into [`UploaderConfig`]. Missing sections
//! and keys take the v1 defaults; malformed values are reported with the
//! file path in the error context.

use std::path::{Path, PathBuf};

use anyhow::Context;
use au_core::UploaderConfig;

const APP_DIR: &str = "asset-uploader";
const CONFIG_FILE: &str = "config.toml";

/// Default config location: `<config dir>/asset-uploader/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read (I/O error)
/// - Content is not valid TOML or does not fit the config shape
pub fn load_config(config_path: &Path) -> anyhow::Result<UploaderConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Load `config_path` if given, else the default path if it exists, else defaults.
pub fn load_or_default(config_path: Option<&Path>) -> anyhow::Result<UploaderConfig> {
    if let Some(path) = config_path {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        _ => {
            tracing::debug!("No config file found, using defaults");
            Ok(UploaderConfig::default())
        }
    }
}

pub fn parse_config(content: &str) -> anyhow::Result<UploaderConfig> {
    toml::from_str(content).context("Failed to parse config as TOML")
}
