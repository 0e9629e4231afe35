// src/process/mod.rs

//! Child process description and execution.
//!
//! - [`spec`] holds [`ProcessSpec`], the command the loop restarts.
//! - [`runner`] defines the [`ProcessRunner`] seam and the tokio-backed
//!   implementation that guarantees no child outlives its cancellation.
//! - [`args`] formats argument lists for status output.

pub mod args;
pub mod runner;
pub mod spec;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

pub use args::escape_and_concatenate;
pub use runner::{ProcessRunner, RunFuture, TokioProcessRunner};
pub use spec::ProcessSpec;
