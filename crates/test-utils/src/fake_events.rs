use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dotwatch::errors::Result;
use dotwatch::fileset::WatchTarget;
use dotwatch::watch::{EventSource, Subscription};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
struct State {
    subscribers: Vec<mpsc::UnboundedSender<PathBuf>>,
    /// Events emitted while nobody was subscribed; handed to the next
    /// subscriber.
    pending: Vec<PathBuf>,
    subscriptions: usize,
    last_targets: Vec<WatchTarget>,
}

/// An event source driven by the test instead of the OS.
#[derive(Debug, Clone, Default)]
pub struct FakeEventSource {
    state: Arc<Mutex<State>>,
}

impl FakeEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `path` to every live subscription, or queue it for the next
    /// one if there is none.
    pub fn emit(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut state = self.state.lock().unwrap();
        state.subscribers.retain(|tx| !tx.is_closed());

        if state.subscribers.is_empty() {
            state.pending.push(path);
            return;
        }
        for tx in &state.subscribers {
            let _ = tx.send(path.clone());
        }
    }

    pub fn subscriptions(&self) -> usize {
        self.state.lock().unwrap().subscriptions
    }

    pub fn live_subscriptions(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    pub fn last_targets(&self) -> Vec<WatchTarget> {
        self.state.lock().unwrap().last_targets.clone()
    }
}

impl EventSource for FakeEventSource {
    fn subscribe(&self, targets: &[WatchTarget]) -> Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().unwrap();

        for path in state.pending.drain(..) {
            let _ = tx.send(path);
        }
        state.subscribers.push(tx);
        state.subscriptions += 1;
        state.last_targets = targets.to_vec();

        Ok(Subscription::new(rx, ()))
    }
}
