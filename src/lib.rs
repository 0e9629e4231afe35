// src/lib.rs

pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod fileset;
pub mod filters;
pub mod fs;
pub mod logging;
pub mod process;
pub mod reporter;
pub mod watch;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_for_project};
use crate::engine::{LoopExit, WatchLoop};
use crate::fileset::{FileSetFactory, GlobFileSetFactory};
use crate::process::TokioProcessRunner;
use crate::reporter::{ConsoleReporter, Reporter};
use crate::watch::NotifyEventSource;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the glob file-set provider
/// - the tokio process runner and notify event source
/// - Ctrl-C handling
/// - the watch loop
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let project_dir = project_dir(&args)?;
    let cfg = load_for_project(args.config.as_deref(), &project_dir)?;
    let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter::new(args.verbose, args.quiet));

    let factory = GlobFileSetFactory::new(&project_dir, cfg.patterns()?);

    if args.list {
        return list_files(&factory, reporter.as_ref()).await;
    }

    let spec = cfg.process_spec(&args.command, &project_dir);
    info!(executable = %spec.executable, args = ?spec.arguments, ?project_dir, "starting watch");

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone(), Arc::clone(&reporter));

    let mut watch_loop = build_watch_loop(&cfg, reporter);
    let exit = watch_loop.watch(spec, &factory, cancel).await?;
    debug!(?exit, "watch loop finished");

    Ok(match exit {
        LoopExit::Cancelled => ExitCode::SUCCESS,
        LoopExit::FileSetUnavailable => ExitCode::FAILURE,
    })
}

fn build_watch_loop(cfg: &ConfigFile, reporter: Arc<dyn Reporter>) -> WatchLoop {
    WatchLoop::new(
        reporter,
        Arc::new(TokioProcessRunner::new(cfg.shutdown_grace())),
        Arc::new(NotifyEventSource),
    )
    .with_watcher_options(cfg.watcher_options())
}

fn project_dir(args: &CliArgs) -> Result<PathBuf> {
    let dir = match &args.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("reading current directory")?,
    };
    Ok(dir.canonicalize().unwrap_or(dir))
}

/// `--list`: print the file set, one path per line.
async fn list_files(factory: &GlobFileSetFactory, reporter: &dyn Reporter) -> Result<ExitCode> {
    let never = CancellationToken::new();
    match factory.create(&never).await? {
        Some(set) => {
            for file in set.files() {
                println!("{}", file.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            reporter.error("Failed to find a list of files to watch");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// First Ctrl-C cancels the loop (which stops the child); a second one exits
/// immediately.
fn spawn_ctrl_c_handler(cancel: CancellationToken, reporter: Arc<dyn Reporter>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            reporter.error(&format!("failed to listen for Ctrl+C: {e}"));
            return;
        }
        reporter.output("Shutdown requested. Press Ctrl+C again to force exit.");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}
