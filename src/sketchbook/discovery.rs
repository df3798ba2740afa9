// src/sketchbook/discovery.rs

//! One-shot discovery of the user's configured sketchbook.
//!
//! Each probe returns `Option<PathBuf>`; failures inside a probe (command
//! error, missing or unreadable file, path that doesn't exist) are logged
//! and turn into `None`, so the chain below is a plain first-match scan:
//!
//! 1. toolchain `config dump` output
//! 2. IDE `preferences.txt`
//! 3. conventional default locations

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::exec::{ExecutionRequest, ToolchainBackend};
use crate::sketchbook::SketchbookLocator;

const CONFIG_DUMP_KEY: &str = "sketchbook";
const PREFERENCES_KEY: &str = "sketchbook.path=";

#[allow(clippy::expect_used)]
static CONFIG_DUMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sketchbook.*?:\s*(.+)").expect("constant regex pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySource {
    ToolchainConfig,
    IdePreferences,
    DefaultLocation,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiscoverySource::ToolchainConfig => "toolchain config",
            DiscoverySource::IdePreferences => "IDE preferences",
            DiscoverySource::DefaultLocation => "default location",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSketchbook {
    pub path: PathBuf,
    pub source: DiscoverySource,
}

impl SketchbookLocator {
    /// Probe external configuration sources in priority order and cache the
    /// first sketchbook found. If nothing is found the cache is left as it
    /// was and callers fall back to the Documents folder.
    pub async fn discover_external_configuration(
        &self,
        backend: &dyn ToolchainBackend,
        config_dump: ExecutionRequest,
    ) -> Option<DiscoveredSketchbook> {
        info!("discovering sketchbook configuration");

        let found = match self.probe_toolchain_config(backend, config_dump).await {
            Some(path) => Some(DiscoveredSketchbook {
                path,
                source: DiscoverySource::ToolchainConfig,
            }),
            None => self
                .probe_preferences_file()
                .map(|path| DiscoveredSketchbook {
                    path,
                    source: DiscoverySource::IdePreferences,
                })
                .or_else(|| {
                    self.probe_default_locations()
                        .map(|path| DiscoveredSketchbook {
                            path,
                            source: DiscoverySource::DefaultLocation,
                        })
                }),
        };

        match &found {
            Some(d) => {
                info!(path = %d.path.display(), source = %d.source, "found sketchbook");
                self.set_discovered(Some(d.path.clone()));
            }
            None => info!("no sketchbook found; will use Documents folder"),
        }

        found
    }

    async fn probe_toolchain_config(
        &self,
        backend: &dyn ToolchainBackend,
        config_dump: ExecutionRequest,
    ) -> Option<PathBuf> {
        let result = backend.execute(config_dump).await;
        if !result.success {
            debug!(
                error = ?result.error_message,
                "toolchain config not available"
            );
            return None;
        }
        let path = PathBuf::from(parse_config_dump(&result.stdout)?);
        self.existing_dir(path, "toolchain config")
    }

    fn probe_preferences_file(&self) -> Option<PathBuf> {
        let prefs = self.preferences_file();
        if !self.fs().is_file(&prefs) {
            debug!(path = %prefs.display(), "no IDE preferences file");
            return None;
        }
        let contents = match self.fs().read_to_string(&prefs) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %prefs.display(), error = %e, "could not read IDE preferences");
                return None;
            }
        };
        let path = PathBuf::from(parse_preferences(&contents)?);
        self.existing_dir(path, "IDE preferences")
    }

    fn probe_default_locations(&self) -> Option<PathBuf> {
        self.well_known_locations()
            .into_iter()
            .find(|p| self.fs().is_dir(p))
    }

    fn existing_dir(&self, path: PathBuf, source: &str) -> Option<PathBuf> {
        if self.fs().is_dir(&path) {
            Some(path)
        } else {
            debug!(path = %path.display(), source, "configured sketchbook does not exist");
            None
        }
    }
}

/// Extract the sketchbook path from toolchain `config dump` output.
///
/// Only the first line mentioning the key is considered. Quote characters
/// are stripped from the value.
pub fn parse_config_dump(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.contains(CONFIG_DUMP_KEY))?;
    let caps = CONFIG_DUMP_PATTERN.captures(line)?;
    let value = caps[1].replace(['\'', '"'], "");
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Extract `sketchbook.path` from an IDE `preferences.txt`.
pub fn parse_preferences(contents: &str) -> Option<String> {
    let value = contents
        .lines()
        .find_map(|l| l.strip_prefix(PREFERENCES_KEY))?
        .trim();
    (!value.is_empty()).then(|| value.to_string())
}
