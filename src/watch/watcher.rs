// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::event_source::{EventSource, Subscription};
use crate::errors::Result;
use crate::fileset::FileSet;

/// Fired once when a wait has been running for a while.
pub type WaitingCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy)]
pub struct WatcherOptions {
    /// Quiet period that must pass after a change before it is reported.
    pub debounce: Duration,
    /// How long a wait runs before the waiting callback fires.
    pub waiting_notice_delay: Duration,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(50),
            waiting_notice_delay: Duration::from_millis(500),
        }
    }
}

/// Waits for a change to any member of a [`FileSet`].
///
/// Cheap to clone; each clone can run its own wait.
#[derive(Clone)]
pub struct FileSetWatcher {
    file_set: Arc<FileSet>,
    source: Arc<dyn EventSource>,
    options: WatcherOptions,
}

impl std::fmt::Debug for FileSetWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSetWatcher")
            .field("file_set_len", &self.file_set.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FileSetWatcher {
    pub fn new(file_set: Arc<FileSet>, source: Arc<dyn EventSource>, options: WatcherOptions) -> Self {
        Self {
            file_set,
            source,
            options,
        }
    }

    pub fn file_set(&self) -> &FileSet {
        &self.file_set
    }

    /// Resolve with the first changed member of the file set.
    ///
    /// - `Ok(None)` if `cancel` fires before any change.
    /// - Events for the same edit (write-then-rename, several writes) are
    ///   absorbed until `debounce` passes without another event; the first
    ///   qualifying path is the one reported.
    /// - `on_waiting` fires at most once, after `waiting_notice_delay`.
    pub async fn wait_for_change(
        &self,
        cancel: CancellationToken,
        on_waiting: Option<WaitingCallback>,
    ) -> Result<Option<PathBuf>> {
        let mut subscription = self.source.subscribe(&self.file_set.watch_targets())?;
        let mut on_waiting = on_waiting;

        let notice = tokio::time::sleep(self.options.waiting_notice_delay);
        tokio::pin!(notice);

        let changed = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    trace!("change wait cancelled");
                    return Ok(None);
                }

                event = subscription.next() => match event {
                    Some(path) => {
                        if let Some(member) = self.qualify(&path).await {
                            break member;
                        }
                        trace!(?path, "ignoring change outside the file set");
                    }
                    None => {
                        debug!("event source closed; waiting for cancellation");
                        cancel.cancelled().await;
                        return Ok(None);
                    }
                },

                _ = &mut notice, if on_waiting.is_some() => {
                    if let Some(callback) = on_waiting.take() {
                        callback();
                    }
                }
            }
        };

        self.settle(&mut subscription, &cancel).await;
        debug!(path = ?changed, "file change detected");
        Ok(Some(changed))
    }

    /// Map an event path to the file-set member it refers to.
    async fn qualify(&self, path: &Path) -> Option<PathBuf> {
        if self.file_set.contains(path) {
            return Some(path.to_path_buf());
        }

        // Event paths may use a different prefix for the same directory.
        // Runs on the blocking pool; a deleted path simply fails here.
        let canonical = tokio::fs::canonicalize(path).await.ok()?;
        self.file_set.contains(&canonical).then_some(canonical)
    }

    /// Drain follow-up events until `debounce` passes without one.
    async fn settle(&self, subscription: &mut Subscription, cancel: &CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(self.options.debounce) => return,
                event = subscription.next() => match event {
                    Some(path) => trace!(?path, "absorbed follow-up event"),
                    None => return,
                },
            }
        }
    }
}
