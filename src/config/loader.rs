// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Name of the config file looked up in the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "dotwatch.toml";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

/// Load the config for a run.
///
/// An explicitly requested file must exist. The implicit default
/// (`<project>/dotwatch.toml`) is optional; built-in defaults apply when it
/// is missing.
pub fn load_for_project(explicit: Option<&Path>, project_dir: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        debug!(?path, "loading explicit config file");
        return load_and_validate(path);
    }

    let path = default_config_path(project_dir);
    if path.is_file() {
        debug!(?path, "loading project config file");
        load_and_validate(&path)
    } else {
        debug!(?path, "no config file; using defaults");
        ConfigFile::try_from(RawConfigFile::default())
    }
}

pub fn default_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DEFAULT_CONFIG_FILE)
}
