// src/sketchbook/store.rs

//! Sketch persistence: `<base>/<name>/<name>.ino`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{BridgeError, Result};
use crate::fs::FileSystem;
use crate::sketchbook::PreferredDirectory;

pub const SKETCH_EXTENSION: &str = "ino";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveLocation {
    /// The resolved preferred directory (sketchbook or Documents).
    Preferred,
    /// The project-local sketch folder.
    Local,
}

/// Where a listed sketch was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchSource {
    Sketchbook,
    Documents,
    Local,
}

impl SketchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SketchSource::Sketchbook => "sketchbook",
            SketchSource::Documents => "documents",
            SketchSource::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SketchEntry {
    pub name: String,
    /// The sketch directory, not the `.ino` file.
    pub path: PathBuf,
    pub modified: SystemTime,
    pub source: SketchSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSketch {
    pub path: PathBuf,
    pub location: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedSketch {
    pub name: String,
    pub content: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SketchStore {
    fs: Arc<dyn FileSystem>,
    local_dir: PathBuf,
}

impl SketchStore {
    pub fn new(fs: Arc<dyn FileSystem>, local_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            local_dir: local_dir.into(),
        }
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Create the local sketch folder if missing.
    pub fn ensure_local_dir(&self) -> Result<()> {
        self.fs.create_dir_all(&self.local_dir)?;
        Ok(())
    }

    pub fn local_sketch_dir(&self, name: &str) -> PathBuf {
        self.local_dir.join(name)
    }

    /// Write `code` to the local folder and return the `.ino` path.
    pub fn write_local(&self, name: &str, code: &str) -> Result<PathBuf> {
        validate_sketch_name(name)?;
        self.write_sketch(&self.local_dir, name, code)
    }

    /// Save into the preferred directory (sketchbook or Documents folder).
    pub fn save_preferred(
        &self,
        name: &str,
        code: &str,
        preferred: &PreferredDirectory,
    ) -> Result<SavedSketch> {
        self.save_in(&preferred.path, preferred.location_description(), name, code)
    }

    /// Save into the project-local sketch folder.
    pub fn save_local(&self, name: &str, code: &str) -> Result<SavedSketch> {
        self.save_in(&self.local_dir, "local project folder", name, code)
    }

    /// Whether `<sketch_dir>/<name>.ino` exists.
    pub fn contains(&self, sketch_dir: &Path, name: &str) -> bool {
        let file = sketch_dir.join(format!("{name}.{SKETCH_EXTENSION}"));
        self.fs.is_file(&file)
    }

    fn save_in(
        &self,
        base: &Path,
        description: &'static str,
        name: &str,
        code: &str,
    ) -> Result<SavedSketch> {
        validate_sketch_name(name)?;
        let path = self.write_sketch(base, name, code)?;
        info!(path = %path.display(), location = description, "sketch saved");
        Ok(SavedSketch {
            path,
            location: description,
        })
    }

    /// All sketches in the preferred and local folders, newest first.
    ///
    /// Directories that cannot be read are skipped.
    pub fn list(&self, preferred: &PreferredDirectory) -> Vec<SketchEntry> {
        let mut sketches = Vec::new();

        for dir in self.search_dirs(preferred) {
            let source = if dir != preferred.path {
                SketchSource::Local
            } else if preferred.is_arduino_sketchbook() {
                SketchSource::Sketchbook
            } else {
                SketchSource::Documents
            };

            let items = match self.fs.read_dir(&dir) {
                Ok(items) => items,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "skipping unreadable sketch folder");
                    continue;
                }
            };

            for item in items {
                if !self.fs.is_dir(&item) {
                    continue;
                }
                let Some(name) = item.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let file = sketch_file(&dir, name);
                if !self.fs.is_file(&file) {
                    continue;
                }
                let Ok(modified) = self.fs.modified(&file) else {
                    continue;
                };
                sketches.push(SketchEntry {
                    name: name.to_string(),
                    path: item.clone(),
                    modified,
                    source,
                });
            }
        }

        sketches.sort_by(|a, b| b.modified.cmp(&a.modified));
        sketches
    }

    /// First sketch called `name`, searching the preferred folder before the
    /// local one.
    pub fn load(
        &self,
        name: &str,
        preferred: &PreferredDirectory,
    ) -> Result<Option<LoadedSketch>> {
        validate_sketch_name(name)?;
        for dir in self.search_dirs(preferred) {
            let file = sketch_file(&dir, name);
            if self.fs.is_file(&file) {
                let content = self.fs.read_to_string(&file)?;
                return Ok(Some(LoadedSketch {
                    name: name.to_string(),
                    content,
                    path: file,
                }));
            }
        }
        Ok(None)
    }

    /// Existing, deduplicated folders to search, preferred first.
    fn search_dirs(&self, preferred: &PreferredDirectory) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::with_capacity(2);
        for dir in [preferred.path.clone(), self.local_dir.clone()] {
            if self.fs.is_dir(&dir) && !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }

    fn write_sketch(&self, base: &Path, name: &str, code: &str) -> Result<PathBuf> {
        let dir = base.join(name);
        self.fs.create_dir_all(&dir)?;
        let file = sketch_file(base, name);
        self.fs.write(&file, code.as_bytes())?;
        Ok(file)
    }
}

/// `<base>/<name>/<name>.ino`
pub fn sketch_file(base: &Path, name: &str) -> PathBuf {
    base.join(name).join(format!("{name}.{SKETCH_EXTENSION}"))
}

/// Sketch names become directory names; reject anything that could escape
/// the base folder.
pub fn validate_sketch_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name.contains("..")
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(BridgeError::InvalidSketchName(name.to_string()));
    }
    Ok(())
}
