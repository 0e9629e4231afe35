// src/watch/event_source.rs

//! The OS change-notification primitive beneath [`super::FileSetWatcher`].
//!
//! An [`EventSource`] turns a list of [`WatchTarget`]s into a stream of raw
//! changed paths. It knows nothing about file sets, debouncing or
//! cancellation.

use std::path::PathBuf;

use notify::event::EventKind;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::errors::Result;
use crate::fileset::WatchTarget;

/// Live registration with an [`EventSource`].
///
/// Dropping it stops the underlying watch.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<PathBuf>,
    _guard: Box<dyn Send>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl Subscription {
    /// `guard` is kept alive for as long as the subscription is.
    pub fn new(events: mpsc::UnboundedReceiver<PathBuf>, guard: impl Send + 'static) -> Self {
        Self {
            events,
            _guard: Box::new(guard),
        }
    }

    /// Next changed path, or `None` once the source has shut down.
    pub async fn next(&mut self) -> Option<PathBuf> {
        self.events.recv().await
    }
}

/// Produces raw change events for a set of watch targets.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, targets: &[WatchTarget]) -> Result<Subscription>;
}

/// Cross-platform source backed by `notify`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyEventSource;

impl EventSource for NotifyEventSource {
    fn subscribe(&self, targets: &[WatchTarget]) -> Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel::<PathBuf>();

        // Called synchronously on notify's own thread.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_change(&event.kind) {
                        trace!(?event, "ignoring non-change event");
                        return;
                    }
                    for path in event.paths {
                        // The receiver is gone once the wait finished; nothing to do.
                        let _ = tx.send(path);
                    }
                }
                Err(err) => warn!(error = %err, "file watch error"),
            },
            Config::default(),
        )?;

        for target in targets {
            let mode = if target.recursive {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            // A directory deleted since the file set was built should not end
            // the wait; the remaining targets still matter.
            if let Err(err) = watcher.watch(&target.path, mode) {
                warn!(path = ?target.path, error = %err, "could not watch directory");
            }
        }

        debug!(targets = targets.len(), "notify watcher registered");
        Ok(Subscription::new(rx, watcher))
    }
}

/// Create, modify (including renames) and remove count as changes; access
/// notifications do not.
fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
