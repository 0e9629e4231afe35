// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Result;
use crate::fileset::glob::WatchPatterns;
use crate::fileset::{DEFAULT_EXCLUDES, DEFAULT_INCLUDES};
use crate::process::ProcessSpec;
use crate::watch::WatcherOptions;

/// Raw configuration as read from a TOML file, before validation.
///
/// ```toml
/// [command]
/// executable = "dotnet"
/// args = ["run"]
/// env = { ASPNETCORE_ENVIRONMENT = "Development" }
///
/// [watch]
/// include = ["**/*.cs", "**/*.csproj"]
/// exclude = ["bin/**", "obj/**"]
/// debounce_ms = 50
/// waiting_notice_ms = 500
///
/// [process]
/// shutdown_grace_ms = 5000
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub command: Option<CommandSection>,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub process: ProcessSection,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    command: Option<CommandSection>,
    watch: WatchSection,
    process: ProcessSection,
}

/// `[command]` section: what to run when no command is given on the CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSection {
    pub executable: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    #[serde(default)]
    pub display_name: Option<String>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_waiting_notice_ms")]
    pub waiting_notice_ms: u64,
}

/// `[process]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessSection {
    /// Time a cancelled child gets to exit before it is force-killed.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

fn default_include() -> Vec<String> {
    DEFAULT_INCLUDES.iter().map(|s| s.to_string()).collect()
}

fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_waiting_notice_ms() -> u64 {
    500
}

fn default_shutdown_grace_ms() -> u64 {
    5000
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            debounce_ms: default_debounce_ms(),
            waiting_notice_ms: default_waiting_notice_ms(),
        }
    }
}

impl Default for ProcessSection {
    fn default() -> Self {
        Self {
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

/// Command used when neither the CLI nor the config names one.
pub const DEFAULT_COMMAND: &[&str] = &["dotnet", "run"];

impl ConfigFile {
    /// Build a `ConfigFile` without running validation.
    ///
    /// Prefer `ConfigFile::try_from(raw)`.
    pub(crate) fn new_unchecked(
        command: Option<CommandSection>,
        watch: WatchSection,
        process: ProcessSection,
    ) -> Self {
        Self {
            command,
            watch,
            process,
        }
    }

    pub fn command(&self) -> Option<&CommandSection> {
        self.command.as_ref()
    }

    pub fn watch_section(&self) -> &WatchSection {
        &self.watch
    }

    pub fn process_section(&self) -> &ProcessSection {
        &self.process
    }

    pub fn patterns(&self) -> Result<WatchPatterns> {
        WatchPatterns::new(&self.watch.include, &self.watch.exclude)
    }

    pub fn watcher_options(&self) -> WatcherOptions {
        WatcherOptions {
            debounce: Duration::from_millis(self.watch.debounce_ms),
            waiting_notice_delay: Duration::from_millis(self.watch.waiting_notice_ms),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.process.shutdown_grace_ms)
    }

    /// Resolve the command to supervise.
    ///
    /// A non-empty `cli_command` (executable followed by its arguments) wins
    /// over `[command]`, which wins over `dotnet run`. Environment entries from
    /// `[command]` are kept either way. The working directory defaults to
    /// `project_dir`.
    pub fn process_spec(&self, cli_command: &[String], project_dir: &Path) -> ProcessSpec {
        let mut spec = match (cli_command.split_first(), &self.command) {
            (Some((exe, args)), _) => ProcessSpec::new(exe.clone(), args.iter().cloned()),
            (None, Some(cmd)) => {
                let mut spec = ProcessSpec::new(cmd.executable.clone(), cmd.args.iter().cloned());
                spec.display_name = cmd.display_name.clone();
                spec.working_directory = cmd.working_directory.clone();
                spec
            }
            (None, None) => ProcessSpec::new(DEFAULT_COMMAND[0], DEFAULT_COMMAND[1..].iter().copied()),
        };

        if let Some(cmd) = &self.command {
            spec.environment.extend(cmd.env.clone());
        }

        let working_directory = match spec.working_directory.take() {
            Some(dir) if dir.is_relative() => project_dir.join(dir),
            Some(dir) => dir,
            None => project_dir.to_path_buf(),
        };
        spec.working_directory = Some(working_directory);
        spec
    }
}
