//! Fakes and helpers shared by the `dotwatch` integration tests.
//!
//! The fakes stand in for the three seams the watch loop talks to:
//! [`ScriptedRunner`] for processes, [`FakeEventSource`] for file
//! notifications and [`StaticFileSetFactory`] for project discovery.
//! [`RecordingReporter`] captures what the user would have seen.

pub mod builders;
pub mod fake_events;
pub mod fake_runner;
pub mod recording_reporter;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

pub use builders::{ConfigFileBuilder, FactoryAnswer, StaticFileSetFactory};
pub use fake_events::FakeEventSource;
pub use fake_runner::{RunScript, ScriptedRunner};
pub use recording_reporter::{Channel, RecordingReporter};

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output only shows up for failing tests (or with `--nocapture`). Defaults
/// to `dotwatch=debug`; override with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,dotwatch=debug"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test step timed out after {TEST_TIMEOUT:?}"))
}

/// Poll `cond` every few milliseconds until it holds, within
/// [`TEST_TIMEOUT`].
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    with_timeout(async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
}
