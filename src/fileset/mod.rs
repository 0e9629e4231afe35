// src/fileset/mod.rs

//! The set of paths the loop watches, and where it comes from.
//!
//! The watch loop never decides which files belong to the project. It asks a
//! [`FileSetFactory`] on the first iteration and again whenever a structural
//! file changed. [`GlobFileSetFactory`] is the built-in provider.

pub mod glob;
pub mod path_utils;

use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::errors::Result;

pub use glob::{DEFAULT_EXCLUDES, DEFAULT_INCLUDES, GlobFileSetFactory};

/// Paths considered part of the watched project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: BTreeSet<PathBuf>,
    /// Watched recursively; every path below one of these is in the set.
    directories: BTreeSet<PathBuf>,
}

/// One registration handed to the event source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub recursive: bool,
}

impl FileSet {
    pub fn new<F, D>(files: F, directories: D) -> Self
    where
        F: IntoIterator<Item = PathBuf>,
        D: IntoIterator<Item = PathBuf>,
    {
        Self {
            files: files.into_iter().collect(),
            directories: directories.into_iter().collect(),
        }
    }

    pub fn from_files<F: IntoIterator<Item = PathBuf>>(files: F) -> Self {
        Self::new(files, std::iter::empty())
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.directories.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path) || self.directories.iter().any(|d| path.starts_with(d))
    }

    /// Directories to subscribe to so that every member is observed.
    ///
    /// Files are covered by a non-recursive watch on their parent directory,
    /// unless a recursive directory already covers that parent.
    pub fn watch_targets(&self) -> Vec<WatchTarget> {
        let mut targets: BTreeSet<WatchTarget> = self
            .directories
            .iter()
            .map(|d| WatchTarget {
                path: d.clone(),
                recursive: true,
            })
            .collect();

        for file in &self.files {
            let Some(parent) = file.parent() else {
                continue;
            };
            if self.directories.iter().any(|d| parent.starts_with(d)) {
                continue;
            }
            targets.insert(WatchTarget {
                path: parent.to_path_buf(),
                recursive: false,
            });
        }

        targets.into_iter().collect()
    }
}

/// Boxed future returned by [`FileSetFactory::create`].
pub type FileSetFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<FileSet>>> + Send + 'a>>;

/// Produces the [`FileSet`] for the project being watched.
pub trait FileSetFactory: Send + Sync {
    /// `Ok(None)` means no usable file set could be determined (or `cancel`
    /// fired first). Errors are reserved for unexpected failures.
    fn create<'a>(&'a self, cancel: &'a CancellationToken) -> FileSetFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_files_and_paths_below_directories() {
        let set = FileSet::new(
            [PathBuf::from("/p/app.csproj"), PathBuf::from("/p/src/Program.cs")],
            [PathBuf::from("/p/wwwroot")],
        );

        assert!(set.contains(Path::new("/p/app.csproj")));
        assert!(set.contains(Path::new("/p/wwwroot/css/site.css")));
        assert!(!set.contains(Path::new("/p/src/Other.cs")));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn watch_targets_dedupe_parents_and_skip_covered_ones() {
        let set = FileSet::new(
            [
                PathBuf::from("/p/a.cs"),
                PathBuf::from("/p/b.cs"),
                PathBuf::from("/p/web/x.js"),
            ],
            [PathBuf::from("/p/web")],
        );

        assert_eq!(
            set.watch_targets(),
            vec![
                WatchTarget {
                    path: PathBuf::from("/p"),
                    recursive: false
                },
                WatchTarget {
                    path: PathBuf::from("/p/web"),
                    recursive: true
                },
            ]
        );
    }
}
