// src/context.rs

//! Per-loop state threaded through every iteration.

use std::path::{Path, PathBuf};

use crate::process::ProcessSpec;

/// Extensions whose change may alter the project's build graph, forcing the
/// file set to be recomputed before the next run. Compared case-insensitively.
pub const STRUCTURAL_EXTENSIONS: &[&str] = &["props", "targets", "csproj", "fsproj", "vbproj"];

/// Mutable state owned by the watch loop for its whole lifetime.
#[derive(Debug, Clone)]
pub struct WatchContext {
    pub process_spec: ProcessSpec,
    /// Number of completed loop bodies; 0 during the first run.
    pub iteration: u64,
    /// The change that triggered the current iteration, if any.
    pub changed_file: Option<PathBuf>,
    pub requires_file_set_reevaluation: bool,
}

impl WatchContext {
    pub fn new(process_spec: ProcessSpec) -> Self {
        Self {
            process_spec,
            iteration: 0,
            changed_file: None,
            requires_file_set_reevaluation: false,
        }
    }

    /// Record the change that ended the previous iteration and move to the
    /// next one.
    pub fn advance(&mut self, changed_file: Option<PathBuf>) {
        self.requires_file_set_reevaluation = changed_file
            .as_deref()
            .is_some_and(requires_file_set_reevaluation);
        self.changed_file = changed_file;
        self.iteration += 1;
    }
}

/// True if `path` has one of the [`STRUCTURAL_EXTENSIONS`].
///
/// A bare dotfile such as `.csproj` counts: its whole name is the extension.
pub fn requires_file_set_reevaluation(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| {
        STRUCTURAL_EXTENSIONS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(ext))
    })
}

fn extension_of(path: &Path) -> Option<&str> {
    if let Some(ext) = path.extension() {
        return ext.to_str();
    }
    // `Path::extension` treats a leading dot as part of the stem.
    path.file_name()?.to_str()?.strip_prefix('.')
}
