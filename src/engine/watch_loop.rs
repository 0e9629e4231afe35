// src/engine/watch_loop.rs

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::race::{Winner, race_then_join};
use crate::context::WatchContext;
use crate::errors::Result;
use crate::fileset::FileSetFactory;
use crate::filters::{WatchFilter, default_filters};
use crate::process::{ProcessRunner, ProcessSpec, escape_and_concatenate};
use crate::reporter::Reporter;
use crate::watch::{EventSource, FileSetWatcher, WaitingCallback, WatcherOptions};

/// 1-based index of the run, visible to the child.
pub const ITERATION_ENV_VAR: &str = "DOTNET_WATCH_ITERATION";
/// Always `1`; lets the child detect that it runs under the watcher.
pub const WATCH_ENV_VAR: &str = "DOTNET_WATCH";

/// Why [`WatchLoop::watch`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The external token fired.
    Cancelled,
    /// The file-set factory produced nothing to watch.
    FileSetUnavailable,
}

enum Prepared {
    Ready(FileSetWatcher),
    Stop(LoopExit),
}

enum IterationEnd {
    /// Start the next iteration; carries the change that triggered it.
    Restart(Option<PathBuf>),
    /// The external token fired.
    Stop,
}

/// Runs a process, restarts it on file changes, until cancelled.
///
/// Every iteration:
/// 1. (re)load the file set when needed, reset the arguments, apply filters,
///    inject the iteration environment;
/// 2. race the process against a file change and the external token;
/// 3. cancel the run scope and join both operations, so no child process
///    survives into the next iteration;
/// 4. report the outcome, wait for a change if the process exited on its own,
///    and go again.
pub struct WatchLoop {
    reporter: Arc<dyn Reporter>,
    runner: Arc<dyn ProcessRunner>,
    events: Arc<dyn EventSource>,
    filters: Vec<Box<dyn WatchFilter>>,
    options: WatcherOptions,
}

impl std::fmt::Debug for WatchLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchLoop")
            .field("filters", &self.filters)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl WatchLoop {
    pub fn new(
        reporter: Arc<dyn Reporter>,
        runner: Arc<dyn ProcessRunner>,
        events: Arc<dyn EventSource>,
    ) -> Self {
        Self {
            reporter,
            runner,
            events,
            filters: default_filters(),
            options: WatcherOptions::default(),
        }
    }

    /// Replace the filter pipeline. Filters run in the given order.
    pub fn with_filters(mut self, filters: Vec<Box<dyn WatchFilter>>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_watcher_options(mut self, options: WatcherOptions) -> Self {
        self.options = options;
        self
    }

    /// Supervise `spec` until `cancel` fires or no file set can be found.
    ///
    /// A non-zero exit of the child is reported and never ends the loop.
    /// Errors from the factory, or from whichever operation decided a race,
    /// are returned.
    pub async fn watch(
        &mut self,
        spec: ProcessSpec,
        factory: &dyn FileSetFactory,
        cancel: CancellationToken,
    ) -> Result<LoopExit> {
        let initial_arguments = spec.arguments.clone();
        let mut context = WatchContext::new(spec);

        let mut watcher = match self.load_file_set(factory, &cancel).await? {
            Prepared::Ready(w) => w,
            Prepared::Stop(exit) => return Ok(exit),
        };

        loop {
            if context.iteration > 0 && context.requires_file_set_reevaluation {
                debug!(iteration = context.iteration, "structural change; reloading file set");
                watcher = match self.load_file_set(factory, &cancel).await? {
                    Prepared::Ready(w) => w,
                    Prepared::Stop(exit) => return Ok(exit),
                };
            }

            if cancel.is_cancelled() {
                return Ok(LoopExit::Cancelled);
            }

            self.prepare_process_spec(&mut context, &initial_arguments);

            match self.run_iteration(&context.process_spec, &watcher, &cancel).await? {
                IterationEnd::Restart(changed) => context.advance(changed),
                IterationEnd::Stop => return Ok(LoopExit::Cancelled),
            }
        }
    }

    async fn load_file_set(
        &self,
        factory: &dyn FileSetFactory,
        cancel: &CancellationToken,
    ) -> Result<Prepared> {
        let file_set = factory.create(cancel).await?;

        if cancel.is_cancelled() {
            return Ok(Prepared::Stop(LoopExit::Cancelled));
        }

        match file_set {
            Some(set) => {
                info!(paths = set.len(), "watching file set");
                Ok(Prepared::Ready(FileSetWatcher::new(
                    Arc::new(set),
                    Arc::clone(&self.events),
                    self.options,
                )))
            }
            None => {
                self.reporter.error("Failed to find a list of files to watch");
                Ok(Prepared::Stop(LoopExit::FileSetUnavailable))
            }
        }
    }

    /// Reset the arguments, run every filter, then set the iteration
    /// variables.
    fn prepare_process_spec(&mut self, context: &mut WatchContext, initial_arguments: &[String]) {
        context.process_spec.arguments = initial_arguments.to_vec();

        for filter in self.filters.iter_mut() {
            filter.apply(context);
        }

        let env = &mut context.process_spec.environment;
        env.insert(ITERATION_ENV_VAR.to_string(), (context.iteration + 1).to_string());
        env.insert(WATCH_ENV_VAR.to_string(), "1".to_string());
    }

    /// One run of the child plus whatever waiting follows it.
    async fn run_iteration(
        &self,
        spec: &ProcessSpec,
        watcher: &FileSetWatcher,
        cancel: &CancellationToken,
    ) -> Result<IterationEnd> {
        let name = spec.short_display_name();
        // Child of the external token: cancelling it stops this run only.
        let scope = cancel.child_token();

        let process = self.runner.run(spec.clone(), scope.clone());
        let change = {
            let watcher = watcher.clone();
            let scope = scope.clone();
            async move { watcher.wait_for_change(scope, None).await }
        };

        self.reporter.verbose(&format!(
            "Running {} with the following arguments: {}",
            name,
            escape_and_concatenate(&spec.arguments)
        ));
        self.reporter.output("Started");

        let outcome = race_then_join(cancel, &scope, process, change).await?;
        let process_won = outcome.winner == Winner::First;
        let mut changed = outcome.second.flatten();

        debug!(winner = ?outcome.winner, exit_code = ?outcome.first, ?changed, "run settled");

        match outcome.first {
            Some(code) if process_won && code != 0 && !cancel.is_cancelled() => {
                self.reporter.error(&format!("Exited with error code {code}"));
            }
            _ => self.reporter.output("Exited"),
        }

        if outcome.winner == Winner::Cancelled || cancel.is_cancelled() {
            return Ok(IterationEnd::Stop);
        }

        if process_won && changed.is_none() {
            let reporter = Arc::clone(&self.reporter);
            let notice: WaitingCallback = Box::new(move || {
                reporter.warn(&format!(
                    "Waiting for a file to change before restarting {name}..."
                ));
            });

            changed = watcher.wait_for_change(cancel.clone(), Some(notice)).await?;
            if changed.is_none() {
                return Ok(IterationEnd::Stop);
            }
        }

        if let Some(path) = &changed {
            self.reporter.output(&format!("File changed: {}", path.display()));
        }

        Ok(IterationEnd::Restart(changed))
    }
}
