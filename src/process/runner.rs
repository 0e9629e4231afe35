// src/process/runner.rs

//! Child process execution.
//!
//! The watch loop only talks to the [`ProcessRunner`] trait, so tests can
//! swap in a scripted runner that never spawns anything. Production uses
//! [`TokioProcessRunner`].

use std::future::Future;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::Context;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{DotwatchError, Result};
use crate::process::ProcessSpec;

/// Boxed future returned by [`ProcessRunner::run`].
///
/// It is `'static` so the watch loop can spawn it next to the file watcher.
pub type RunFuture = Pin<Box<dyn Future<Output = Result<i32>> + Send + 'static>>;

/// Runs one instance of a [`ProcessSpec`] to completion.
pub trait ProcessRunner: Send + Sync {
    /// Start the process and resolve with its exit code.
    ///
    /// Once `cancel` fires the implementation must terminate the OS process
    /// and wait for it to exit before resolving.
    fn run(&self, spec: ProcessSpec, cancel: CancellationToken) -> RunFuture;
}

/// Runner backed by `tokio::process`.
///
/// stdio is inherited so the child's output goes straight to the terminal.
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    shutdown_grace: Duration,
}

impl TokioProcessRunner {
    pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

    pub fn new(shutdown_grace: Duration) -> Self {
        Self { shutdown_grace }
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHUTDOWN_GRACE)
    }
}

impl ProcessRunner for TokioProcessRunner {
    fn run(&self, spec: ProcessSpec, cancel: CancellationToken) -> RunFuture {
        let grace = self.shutdown_grace;
        Box::pin(run_process(spec, cancel, grace))
    }
}

async fn run_process(spec: ProcessSpec, cancel: CancellationToken, grace: Duration) -> Result<i32> {
    let mut cmd = Command::new(&spec.executable);
    cmd.args(&spec.arguments)
        .envs(&spec.environment)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    if let Some(dir) = &spec.working_directory {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| DotwatchError::Spawn {
        executable: spec.executable.clone(),
        source,
    })?;
    let pid = child.id();

    info!(executable = %spec.executable, ?pid, "child process started");

    tokio::select! {
        status = child.wait() => {
            let status = status.with_context(|| {
                format!("waiting for process '{}'", spec.executable)
            })?;
            let code = exit_code(status);
            info!(executable = %spec.executable, exit_code = code, "child process exited");
            Ok(code)
        }

        _ = cancel.cancelled() => {
            debug!(executable = %spec.executable, ?pid, "cancellation requested; stopping child process");
            Ok(stop_child(&mut child, pid, grace).await?)
        }
    }
}

/// Ask the child to stop, then force-kill it if it is still alive after
/// `grace`. Always waits for the exit.
async fn stop_child(child: &mut Child, pid: Option<u32>, grace: Duration) -> anyhow::Result<i32> {
    if let Some(pid) = pid {
        // taskkill on windows is a blocking call.
        tokio::task::spawn_blocking(move || send_graceful(pid))
            .await
            .context("sending graceful stop to child process")?;
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => {
            let code = exit_code(status.context("waiting for stopped child process")?);
            debug!(?pid, exit_code = code, "child process stopped");
            Ok(code)
        }
        Err(_) => {
            warn!(?pid, grace_ms = grace.as_millis() as u64, "child ignored stop request; killing");
            child.kill().await.context("killing child process")?;
            let status = child.wait().await.context("waiting for killed child process")?;
            Ok(exit_code(status))
        }
    }
}

#[cfg(unix)]
fn send_graceful(pid: u32) {
    super::unix::send_graceful(pid);
}

#[cfg(windows)]
fn send_graceful(pid: u32) {
    super::windows::send_graceful(pid);
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_exit_code_of_finished_process() {
        let runner = TokioProcessRunner::default();
        let spec = ProcessSpec::new("sh", ["-c", "exit 3"]);

        let code = runner.run(spec, CancellationToken::new()).await.unwrap();
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn passes_environment_to_child() {
        let runner = TokioProcessRunner::default();
        let spec = ProcessSpec::new("sh", ["-c", r#"test "$DOTWATCH_ENV_CHECK" = yes"#])
            .with_env("DOTWATCH_ENV_CHECK", "yes");

        let code = runner.run(spec, CancellationToken::new()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn cancellation_terminates_long_running_child() {
        let runner = TokioProcessRunner::new(Duration::from_millis(200));
        let spec = ProcessSpec::new("sleep", ["30"]);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(runner.run(spec, cancel.clone()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let code = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runner did not stop the child in time")
            .unwrap()
            .unwrap();
        // Killed by SIGTERM, so there is no exit code.
        assert_eq!(code, -1);
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error() {
        let runner = TokioProcessRunner::default();
        let spec = ProcessSpec::new("/definitely/not/a/real/binary", Vec::<String>::new());

        let err = runner.run(spec, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DotwatchError::Spawn { .. }));
    }
}
