// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Clone)]
struct MockNode {
    entry: MockEntry,
    modified: SystemTime,
}

/// In-memory filesystem for tests.
///
/// Modification times come from a logical clock that advances by one second
/// on every mutation, so "newest first" ordering follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    nodes: Arc<Mutex<HashMap<PathBuf, MockNode>>>,
    clock: Arc<Mutex<u64>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let now = self.tick();
        let mut nodes = self.nodes.lock().unwrap();
        nodes.insert(
            path.clone(),
            MockNode {
                entry: MockEntry::File(content.into()),
                modified: now,
            },
        );
        if let Some(parent) = path.parent() {
            Self::ensure_dir(&mut nodes, parent, now);
            Self::link_child(&mut nodes, parent, &path);
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let now = self.tick();
        let mut nodes = self.nodes.lock().unwrap();
        Self::ensure_dir(&mut nodes, path.as_ref(), now);
    }

    /// Remove a path and everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut nodes = self.nodes.lock().unwrap();
        nodes.retain(|p, _| !p.starts_with(path));
        if let Some(parent) = path.parent() {
            if let Some(MockNode {
                entry: MockEntry::Dir(children),
                ..
            }) = nodes.get_mut(parent)
            {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    children.retain(|c| c != name);
                }
            }
        }
    }

    fn tick(&self) -> SystemTime {
        let mut clock = self.clock.lock().unwrap();
        *clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(*clock)
    }

    fn ensure_dir(nodes: &mut HashMap<PathBuf, MockNode>, path: &Path, now: SystemTime) {
        if path.as_os_str().is_empty() || nodes.contains_key(path) {
            return;
        }
        nodes.insert(
            path.to_path_buf(),
            MockNode {
                entry: MockEntry::Dir(Vec::new()),
                modified: now,
            },
        );
        if let Some(parent) = path.parent() {
            if parent != path {
                Self::ensure_dir(nodes, parent, now);
                Self::link_child(nodes, parent, path);
            }
        }
    }

    fn link_child(nodes: &mut HashMap<PathBuf, MockNode>, parent: &Path, child: &Path) {
        if let Some(MockNode {
            entry: MockEntry::Dir(children),
            ..
        }) = nodes.get_mut(parent)
        {
            if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(path).map(|n| &n.entry) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.is_file(path) {
            return Err(anyhow!("Is a file: {:?}", path));
        }
        self.add_dir(path);
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        let nodes = self.nodes.lock().unwrap();
        matches!(nodes.get(path).map(|n| &n.entry), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let nodes = self.nodes.lock().unwrap();
        matches!(nodes.get(path).map(|n| &n.entry), Some(MockEntry::Dir(_)))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let nodes = self.nodes.lock().unwrap();
        nodes
            .get(path)
            .map(|n| n.modified)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(path).map(|n| &n.entry) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
