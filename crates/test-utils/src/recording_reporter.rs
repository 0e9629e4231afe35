use std::sync::{Arc, Mutex};

use dotwatch::reporter::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Output,
    Warn,
    Error,
    Verbose,
}

/// Reporter that keeps every message, in order, for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    messages: Arc<Mutex<Vec<(Channel, String)>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Channel, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn on(&self, channel: Channel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn contains(&self, channel: Channel, needle: &str) -> bool {
        self.on(channel).iter().any(|m| m.contains(needle))
    }

    pub fn count(&self, channel: Channel, needle: &str) -> usize {
        self.on(channel).iter().filter(|m| m.contains(needle)).count()
    }

    fn push(&self, channel: Channel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((channel, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn output(&self, message: &str) {
        self.push(Channel::Output, message);
    }

    fn warn(&self, message: &str) {
        self.push(Channel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Channel::Error, message);
    }

    fn verbose(&self, message: &str) {
        self.push(Channel::Verbose, message);
    }
}
