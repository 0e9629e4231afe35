// src/filters/mod.rs

//! Argument filters applied before every run.
//!
//! The loop resets the spec's arguments to the caller-supplied list and then
//! hands the context to each filter in registration order. A filter may
//! rewrite `context.process_spec.arguments`; nothing else is expected to
//! change.

pub mod no_restore;

use std::fmt;

use crate::context::WatchContext;

pub use no_restore::{NO_RESTORE_FLAG, NoRestoreFilter};

/// A single stage of the argument pipeline.
///
/// Implementations must give the same result when called again with the
/// same context; any state they keep is private and decided from the first
/// iteration.
///
/// Order matters: a filter sees the output of the filters registered before
/// it. [`NoRestoreFilter`] replaces the whole argument list on restarts with
/// the list it cached on iteration 0, so a filter placed ahead of it whose
/// output varies per iteration is frozen at its first value. Register such
/// filters after it.
pub trait WatchFilter: Send + Sync + fmt::Debug {
    fn apply(&mut self, context: &mut WatchContext);
}

/// The filters a [`crate::engine::WatchLoop`] registers unless told
/// otherwise.
pub fn default_filters() -> Vec<Box<dyn WatchFilter>> {
    vec![Box::new(NoRestoreFilter::new())]
}
