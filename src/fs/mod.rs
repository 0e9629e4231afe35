// src/fs/mod.rs

//! Directory listing behind a trait, so the file-set walk can run against an
//! in-memory tree in tests.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Sockets, dangling links and anything else the walk skips.
    Other,
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// What the file-set walk needs from a filesystem.
pub trait FileSystem: Send + Sync + Debug {
    fn is_dir(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Children of `path`, sorted by path.
    fn list_dir(&self, path: &Path) -> Result<Vec<Entry>>;
}

/// Implementation that uses `std::fs`.
///
/// Symlinks to files count as files. Symlinks to directories are reported as
/// [`EntryKind::Other`] so a walk can never loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {}", path.display()))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<Entry>> {
        let reader =
            fs::read_dir(path).with_context(|| format!("listing {}", path.display()))?;

        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.with_context(|| format!("listing {}", path.display()))?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            let kind = if file_type.is_dir() {
                EntryKind::Dir
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            entries.push(Entry { path, kind });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
