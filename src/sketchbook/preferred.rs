// src/sketchbook/preferred.rs

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, warn};

use crate::sketchbook::{DOCUMENTS_FALLBACK_NAME, SketchbookLocator};

/// Which rule produced the preferred directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryKind {
    /// The sketchbook cached by discovery.
    Discovered,
    /// The first existing conventional location.
    WellKnown,
    /// `~/Documents/Arduino Sketches` (or a temp-dir twin), created on demand.
    DocumentsFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferredDirectory {
    pub path: PathBuf,
    pub kind: DirectoryKind,
}

impl PreferredDirectory {
    pub fn is_arduino_sketchbook(&self) -> bool {
        !matches!(self.kind, DirectoryKind::DocumentsFallback)
    }

    pub fn location_description(&self) -> &'static str {
        if self.is_arduino_sketchbook() {
            "Arduino sketchbook"
        } else {
            "Documents folder"
        }
    }
}

impl SketchbookLocator {
    /// Directory sketches should be read from and written to right now.
    ///
    /// Re-evaluated on every call against the filesystem. Always returns an
    /// existing directory, creating the fallback if needed.
    pub fn resolve_preferred_directory(&self) -> PreferredDirectory {
        if let Some(path) = self.discovered() {
            if self.fs().is_dir(&path) {
                debug!(path = %path.display(), "using discovered sketchbook");
                return PreferredDirectory {
                    path,
                    kind: DirectoryKind::Discovered,
                };
            }
            debug!(path = %path.display(), "discovered sketchbook no longer exists");
        }

        if let Some(path) = self
            .well_known_locations()
            .into_iter()
            .find(|p| self.fs().is_dir(p))
        {
            debug!(path = %path.display(), "using well-known sketchbook location");
            return PreferredDirectory {
                path,
                kind: DirectoryKind::WellKnown,
            };
        }

        PreferredDirectory {
            path: self.ensure_fallback(),
            kind: DirectoryKind::DocumentsFallback,
        }
    }

    fn ensure_fallback(&self) -> PathBuf {
        let primary = self.documents_fallback();
        let secondary = std::env::temp_dir().join(DOCUMENTS_FALLBACK_NAME);

        for candidate in [primary, secondary] {
            if self.fs().is_dir(&candidate) {
                return candidate;
            }
            match self.fs().create_dir_all(&candidate) {
                Ok(()) => {
                    debug!(path = %candidate.display(), "created fallback sketch folder");
                    return candidate;
                }
                Err(e) => {
                    warn!(path = %candidate.display(), error = %e, "cannot create fallback sketch folder");
                }
            }
        }

        // Both creations failed; the working directory is the only place
        // left that is known to exist.
        PathBuf::from(".")
    }
}
