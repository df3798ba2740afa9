// src/config/validate.rs

use crate::config::model::{BridgeConfig, RawBridgeConfig};
use crate::errors::{BridgeError, Result};

impl TryFrom<RawBridgeConfig> for BridgeConfig {
    type Error = BridgeError;

    fn try_from(raw: RawBridgeConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(BridgeConfig::new_unchecked(raw))
    }
}

/// Run all semantic checks on an already-deserialized config.
pub fn validate_config(cfg: &RawBridgeConfig) -> Result<()> {
    validate_raw_config(cfg)
}

fn validate_raw_config(cfg: &RawBridgeConfig) -> Result<()> {
    validate_toolchain(cfg)?;
    validate_timeouts(cfg)?;
    validate_monitor(cfg)?;
    Ok(())
}

fn validate_toolchain(cfg: &RawBridgeConfig) -> Result<()> {
    let binary = cfg.toolchain.binary.trim();
    if binary.is_empty() {
        return Err(BridgeError::ConfigError(
            "[toolchain].binary must not be empty".to_string(),
        ));
    }
    if binary.contains(char::is_whitespace) {
        return Err(BridgeError::ConfigError(format!(
            "[toolchain].binary must be a bare executable name (got '{binary}')"
        )));
    }
    Ok(())
}

fn validate_timeouts(cfg: &RawBridgeConfig) -> Result<()> {
    let t = &cfg.timeouts;
    for (key, value) in [
        ("default_ms", t.default_ms),
        ("compile_ms", t.compile_ms),
        ("upload_ms", t.upload_ms),
    ] {
        if value == 0 {
            return Err(BridgeError::ConfigError(format!(
                "[timeouts].{key} must be >= 1 (got 0)"
            )));
        }
    }
    Ok(())
}

fn validate_monitor(cfg: &RawBridgeConfig) -> Result<()> {
    if cfg.monitor.baud == 0 {
        return Err(BridgeError::ConfigError(
            "[monitor].baud must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.monitor.timeout_secs == 0 {
        return Err(BridgeError::ConfigError(
            "[monitor].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.monitor.banners.iter().any(|b| b.trim().is_empty()) {
        return Err(BridgeError::ConfigError(
            "[monitor].banners must not contain empty entries".to_string(),
        ));
    }
    Ok(())
}
