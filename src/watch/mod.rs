// src/watch/mod.rs

//! File watching.
//!
//! - [`event_source`] wraps the OS notification primitive (`notify`) behind
//!   the [`EventSource`] trait.
//! - [`watcher`] turns raw events into "a member of the file set changed",
//!   with debouncing, cancellation and the "still waiting" notice.

pub mod event_source;
pub mod watcher;

pub use event_source::{EventSource, NotifyEventSource, Subscription};
pub use watcher::{FileSetWatcher, WaitingCallback, WatcherOptions};
