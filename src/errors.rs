// src/errors.rs

//! Crate-wide error type.
//!
//! A child exiting with a non-zero code is not an error; it is reported and
//! the loop carries on. Everything here ends the loop.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DotwatchError {
    /// The config file parsed but describes something unusable.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobError(#[from] globset::Error),

    /// The OS refused to set up a file watch at all.
    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    /// The supervised command could not be started.
    #[error("Failed to start '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    /// A background task was cancelled by the runtime (shutdown) rather than
    /// finishing. Panics are resumed, never wrapped.
    #[error("Background task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DotwatchError>;
