// src/exec/locator.rs

//! Resolution of the toolchain executable.
//!
//! A copy of the toolchain shipped next to sketchbridge wins over whatever
//! is on `PATH`. The substitution happens once per invocation, before the
//! process starts, and is invisible in the result.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ToolchainSection;

#[derive(Debug, Clone)]
pub struct ToolchainLocator {
    binary: String,
    bundle_dir: Option<PathBuf>,
}

impl ToolchainLocator {
    pub fn new(binary: impl Into<String>, bundle_dir: Option<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            bundle_dir,
        }
    }

    pub fn from_config(cfg: &ToolchainSection) -> Self {
        Self::new(cfg.binary.clone(), cfg.effective_bundle_dir())
    }

    /// Bare executable name, as used in command lines.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Path of the bundled toolchain, if one exists in the bundle directory.
    pub fn bundled_binary(&self) -> Option<PathBuf> {
        let dir = self.bundle_dir.as_deref()?;
        bundled_candidates(dir, &self.binary)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    /// Program to spawn directly (no shell): the bundled copy or the bare
    /// name, which the OS resolves through `PATH`.
    pub fn program(&self) -> PathBuf {
        match self.bundled_binary() {
            Some(path) => {
                debug!(path = %path.display(), "using bundled toolchain");
                path
            }
            None => PathBuf::from(&self.binary),
        }
    }

    /// Rewrite a shell command line so that a leading toolchain invocation
    /// points at the bundled copy. Other command lines pass through.
    pub fn rewrite_command_line(&self, command_line: &str) -> String {
        let Some(rest) = command_line.strip_prefix(self.binary.as_str()) else {
            return command_line.to_string();
        };
        // "arduino-clix" is a different program.
        if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
            return command_line.to_string();
        }
        match self.bundled_binary() {
            Some(path) => {
                debug!(path = %path.display(), "rewriting command to bundled toolchain");
                format!("\"{}\"{}", path.display(), rest)
            }
            None => command_line.to_string(),
        }
    }

    /// Command line for a toolchain subcommand, e.g. `command_line("board list")`.
    pub fn command_line(&self, subcommand: &str) -> String {
        format!("{} {}", self.binary, subcommand)
    }
}

fn bundled_candidates(dir: &Path, binary: &str) -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(2);
    if cfg!(windows) && !binary.to_lowercase().ends_with(".exe") {
        out.push(dir.join(format!("{binary}.exe")));
    }
    out.push(dir.join(binary));
    out
}
