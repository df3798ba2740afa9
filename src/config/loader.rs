// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{BridgeConfig, RawBridgeConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawBridgeConfig`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for the
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBridgeConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawBridgeConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let raw_config = load_from_path(&path)?;
    let config = BridgeConfig::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the defaults.
///
/// A file that exists but cannot be read or parsed is still an error.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(BridgeConfig::default());
    }
    load_and_validate(path)
}

/// Config file looked up in the current working directory when `--config`
/// is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Sketchbridge.toml";

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
