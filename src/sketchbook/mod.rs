// src/sketchbook/mod.rs

//! Where sketches live.
//!
//! - [`discovery`] probes external configuration sources once at startup
//!   and caches the sketchbook it finds.
//! - [`preferred`] resolves the directory to use right now, falling back to
//!   a created Documents folder.
//! - [`store`] saves, lists and loads sketches under those directories.

pub mod discovery;
pub mod preferred;
pub mod store;

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::fs::FileSystem;

pub use discovery::{DiscoveredSketchbook, DiscoverySource, parse_config_dump, parse_preferences};
pub use preferred::{DirectoryKind, PreferredDirectory};
pub use store::{LoadedSketch, SaveLocation, SavedSketch, SketchEntry, SketchSource, SketchStore};

/// Name of the fallback folder created under `~/Documents`.
pub const DOCUMENTS_FALLBACK_NAME: &str = "Arduino Sketches";

/// Sketchbook resolution state.
///
/// Clones share the discovered-sketchbook cache: whatever
/// [`SketchbookLocator::discover_external_configuration`] finds stays visible
/// to every clone until the process exits.
#[derive(Debug, Clone)]
pub struct SketchbookLocator {
    fs: Arc<dyn FileSystem>,
    home: PathBuf,
    discovered: Arc<RwLock<Option<PathBuf>>>,
}

impl SketchbookLocator {
    pub fn new(fs: Arc<dyn FileSystem>, home: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            home: home.into(),
            discovered: Arc::new(RwLock::new(None)),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Cached sketchbook found by discovery, if any.
    pub fn discovered(&self) -> Option<PathBuf> {
        self.discovered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_discovered(&self, path: Option<PathBuf>) {
        *self
            .discovered
            .write()
            .unwrap_or_else(PoisonError::into_inner) = path;
    }

    /// Conventional sketchbook locations, highest priority first.
    pub fn well_known_locations(&self) -> Vec<PathBuf> {
        vec![
            self.home.join("Documents").join("Arduino"),
            self.home.join("Arduino"),
            self.home.join("Sketchbook"),
        ]
    }

    pub fn documents_fallback(&self) -> PathBuf {
        self.home.join("Documents").join(DOCUMENTS_FALLBACK_NAME)
    }

    /// IDE preferences file for the current platform.
    pub fn preferences_file(&self) -> PathBuf {
        let rel: &[&str] = if cfg!(windows) {
            &["AppData", "Roaming", "Arduino15", "preferences.txt"]
        } else if cfg!(target_os = "macos") {
            &["Library", "Arduino15", "preferences.txt"]
        } else {
            &[".arduino15", "preferences.txt"]
        };
        rel.iter().fold(self.home.clone(), |p, part| p.join(part))
    }

    pub(crate) fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}
