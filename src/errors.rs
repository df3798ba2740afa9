// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Process outcomes are never errors: they are always reported through
//! [`crate::types::ExecutionResult`]. `BridgeError` covers the surfaces
//! around them (config loading, sketch persistence).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid sketch name: {0}")]
    InvalidSketchName(String),

    #[error("Sketch file not found: {0}. Please compile first.")]
    SketchNotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
