// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: finding and reading the file.
//! - `validate.rs`: `RawConfigFile` -> `ConfigFile` checks.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_for_project, load_from_path};
pub use model::{CommandSection, ConfigFile, ProcessSection, RawConfigFile, WatchSection};
