// src/fileset/glob.rs

//! Glob-driven file-set provider.
//!
//! Walks the project directory and keeps every file whose path (relative to
//! the project root) matches an include pattern and no exclude pattern:
//!
//! ```toml
//! [watch]
//! include = ["**/*.cs", "**/*.csproj"]
//! exclude = ["bin/**", "obj/**"]
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::path_utils::relative_str;
use super::{FileSet, FileSetFactory, FileSetFuture};
use crate::errors::Result;
use crate::fs::{Entry, EntryKind, FileSystem, RealFileSystem};

pub const DEFAULT_INCLUDES: &[&str] = &["**/*"];
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "bin/**",
    "obj/**",
    "**/bin/**",
    "**/obj/**",
    ".git/**",
    "target/**",
];

/// Compiled include/exclude patterns.
#[derive(Clone)]
pub struct WatchPatterns {
    include: GlobSet,
    exclude: GlobSet,
    /// Excludes of the form `dir/**`, minus the suffix, so whole directories
    /// can be skipped during the walk.
    prune: GlobSet,
}

impl fmt::Debug for WatchPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchPatterns")
            .field("include", &self.include.len())
            .field("exclude", &self.exclude.len())
            .finish()
    }
}

impl WatchPatterns {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let prune_patterns: Vec<String> = exclude
            .iter()
            .filter_map(|p| p.strip_suffix("/**"))
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
            prune: build_globset(&prune_patterns)?,
        })
    }

    pub fn defaults() -> Result<Self> {
        Self::new(&to_strings(DEFAULT_INCLUDES), &to_strings(DEFAULT_EXCLUDES))
    }

    /// `rel_path` uses forward slashes, e.g. `"src/Program.cs"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.include.is_match(rel_path) && !self.exclude.is_match(rel_path)
    }

    fn prunes_dir(&self, rel_dir: &str) -> bool {
        self.prune.is_match(rel_dir) || self.exclude.is_match(rel_dir)
    }
}

/// Default provider: a recursive walk of `root` filtered by [`WatchPatterns`].
#[derive(Debug, Clone)]
pub struct GlobFileSetFactory {
    root: PathBuf,
    patterns: WatchPatterns,
    fs: Arc<dyn FileSystem>,
}

impl GlobFileSetFactory {
    pub fn new(root: impl Into<PathBuf>, patterns: WatchPatterns) -> Self {
        Self::with_fs(root, patterns, Arc::new(RealFileSystem))
    }

    pub fn with_fs(root: impl Into<PathBuf>, patterns: WatchPatterns, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            patterns,
            fs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Synchronous walk; `create` runs this on the blocking pool.
    pub fn collect(&self) -> Result<Option<FileSet>> {
        collect_file_set(self.fs.as_ref(), &self.root, &self.patterns)
    }
}

impl FileSetFactory for GlobFileSetFactory {
    fn create<'a>(&'a self, cancel: &'a CancellationToken) -> FileSetFuture<'a> {
        let factory = self.clone();

        Box::pin(async move {
            let walk = tokio::task::spawn_blocking(move || factory.collect());

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("file set walk abandoned; cancellation requested");
                    Ok(None)
                }
                joined = walk => joined?,
            }
        })
    }
}

fn collect_file_set(fs: &dyn FileSystem, root: &Path, patterns: &WatchPatterns) -> Result<Option<FileSet>> {
    if !fs.is_dir(root) {
        warn!(?root, "project directory does not exist");
        return Ok(None);
    }
    let root = fs.canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let mut files = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(dir) = stack.pop() {
        let entries = fs
            .list_dir(&dir)
            .with_context(|| format!("walking project directory {}", root.display()))?;

        for Entry { path, kind } in entries {
            let Some(rel) = relative_str(&root, &path) else {
                continue;
            };

            match kind {
                EntryKind::Dir if patterns.prunes_dir(&rel) => {
                    debug!(dir = %rel, "skipping excluded directory");
                }
                EntryKind::Dir => stack.push(path),
                EntryKind::File if patterns.matches(&rel) => files.push(path),
                EntryKind::File | EntryKind::Other => {}
            }
        }
    }

    if files.is_empty() {
        warn!(?root, "no files matched the watch patterns");
        return Ok(None);
    }

    info!(?root, count = files.len(), "collected file set");
    Ok(Some(FileSet::from_files(files)))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

fn to_strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
