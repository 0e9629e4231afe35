use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dotwatch::errors::DotwatchError;
use dotwatch::process::{ProcessRunner, ProcessSpec, RunFuture};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// What one scripted run does.
#[derive(Debug, Clone)]
pub enum RunScript {
    /// Exit immediately with the code.
    Exit(i32),
    /// Exit with the code after a delay, unless cancelled first.
    ExitAfter(Duration, i32),
    /// Run until cancelled.
    UntilCancelled,
    /// Fail to start, like a missing executable.
    Fail(String),
}

#[derive(Debug)]
struct Inner {
    scripts: Mutex<VecDeque<RunScript>>,
    specs: Mutex<Vec<ProcessSpec>>,
    live: AtomicUsize,
    max_live: AtomicUsize,
    cancelled: AtomicUsize,
    started: watch::Sender<usize>,
}

/// A fake runner that:
/// - records the spec of every run
/// - follows a queue of [`RunScript`]s, then runs until cancelled
/// - tracks how many runs are live at once.
#[derive(Debug, Clone)]
pub struct ScriptedRunner {
    inner: Arc<Inner>,
}

impl ScriptedRunner {
    pub fn new<I: IntoIterator<Item = RunScript>>(scripts: I) -> Self {
        let (started, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                scripts: Mutex::new(scripts.into_iter().collect()),
                specs: Mutex::new(Vec::new()),
                live: AtomicUsize::new(0),
                max_live: AtomicUsize::new(0),
                cancelled: AtomicUsize::new(0),
                started,
            }),
        }
    }

    /// Specs of all runs started so far, in order.
    pub fn specs(&self) -> Vec<ProcessSpec> {
        self.inner.specs.lock().unwrap().clone()
    }

    pub fn arguments(&self) -> Vec<Vec<String>> {
        self.specs().into_iter().map(|s| s.arguments).collect()
    }

    pub fn runs(&self) -> usize {
        self.inner.specs.lock().unwrap().len()
    }

    pub fn live(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Highest number of runs that were live at the same time.
    pub fn max_live(&self) -> usize {
        self.inner.max_live.load(Ordering::SeqCst)
    }

    /// Runs that ended because their token fired.
    pub fn cancelled_runs(&self) -> usize {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` runs have started.
    pub async fn wait_for_runs(&self, n: usize) {
        let mut rx = self.inner.started.subscribe();
        rx.wait_for(|started| *started >= n)
            .await
            .expect("runner dropped");
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, spec: ProcessSpec, cancel: CancellationToken) -> RunFuture {
        let inner = Arc::clone(&self.inner);

        Box::pin(async move {
            let script = inner
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(RunScript::UntilCancelled);

            if let RunScript::Fail(msg) = script {
                return Err(DotwatchError::Spawn {
                    executable: spec.executable,
                    source: io::Error::new(io::ErrorKind::NotFound, msg),
                });
            }

            let live = inner.live.fetch_add(1, Ordering::SeqCst) + 1;
            inner.max_live.fetch_max(live, Ordering::SeqCst);
            inner.specs.lock().unwrap().push(spec);
            inner.started.send_modify(|n| *n += 1);

            let code = match script {
                RunScript::Exit(code) => code,
                RunScript::ExitAfter(delay, code) => tokio::select! {
                    _ = tokio::time::sleep(delay) => code,
                    _ = cancel.cancelled() => {
                        inner.cancelled.fetch_add(1, Ordering::SeqCst);
                        -1
                    }
                },
                RunScript::UntilCancelled => {
                    cancel.cancelled().await;
                    inner.cancelled.fetch_add(1, Ordering::SeqCst);
                    -1
                }
                RunScript::Fail(_) => unreachable!("handled above"),
            };

            inner.live.fetch_sub(1, Ordering::SeqCst);
            Ok(code)
        })
    }
}
