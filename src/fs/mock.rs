// src/fs/mock.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, bail};

use super::{Entry, EntryKind, FileSystem};

/// In-memory project tree for file-set tests.
///
/// Directories are created implicitly for every added path. Use absolute
/// paths so results look like what the real provider returns.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    /// Directory -> child paths. Files appear only as children.
    dirs: Arc<Mutex<BTreeMap<PathBuf, BTreeSet<PathBuf>>>>,
    files: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.lock().unwrap_or_else(|p| p.into_inner()).insert(path.to_path_buf());
        self.link(path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.dirs().entry(path.to_path_buf()).or_default();
        self.link(path);
    }

    fn dirs(&self) -> MutexGuard<'_, BTreeMap<PathBuf, BTreeSet<PathBuf>>> {
        self.dirs.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Register `path` with each of its ancestors.
    fn link(&self, path: &Path) {
        let mut dirs = self.dirs();
        let mut child = path;
        while let Some(parent) = child.parent() {
            if parent.as_os_str().is_empty() {
                break;
            }
            dirs.entry(parent.to_path_buf())
                .or_default()
                .insert(child.to_path_buf());
            child = parent;
        }
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs().contains_key(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let known = self.is_dir(path)
            || self.files.lock().unwrap_or_else(|p| p.into_inner()).contains(path);
        if !known {
            bail!("not found: {}", path.display());
        }
        Ok(path.to_path_buf())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<Entry>> {
        let dirs = self.dirs();
        let Some(children) = dirs.get(path) else {
            bail!("not a directory: {}", path.display());
        };

        Ok(children
            .iter()
            .map(|child| Entry {
                path: child.clone(),
                kind: if dirs.contains_key(child) {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                },
            })
            .collect())
    }
}
