// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dotwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dotwatch",
    version,
    about = "Run a command and restart it whenever project files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// Default: `dotwatch.toml` in the project directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project directory to watch. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Print the files that would be watched and exit.
    #[arg(long)]
    pub list: bool,

    /// Suppress everything but errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show verbose status messages.
    #[arg(short, long)]
    pub verbose: bool,

    /// Diagnostic logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DOTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Command to run, e.g. `-- dotnet run --project src/Api`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
