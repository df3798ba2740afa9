// src/config/mod.rs

//! Configuration loading and validation for sketchbridge.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a config file from disk (optional file).
//! - `validate.rs`: `RawBridgeConfig` -> `BridgeConfig` with sanity checks.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    DEFAULT_CONFIG_FILE, default_config_path, load_and_validate, load_from_path, load_or_default,
};
pub use model::{
    BridgeConfig, MonitorSection, RawBridgeConfig, SketchbookSection, TimeoutSection,
    ToolchainSection,
};
pub use validate::validate_config;
