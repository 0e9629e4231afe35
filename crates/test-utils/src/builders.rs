#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dotwatch::config::{CommandSection, ConfigFile, RawConfigFile};
use dotwatch::errors::DotwatchError;
use dotwatch::fileset::{FileSet, FileSetFactory, FileSetFuture};
use tokio_util::sync::CancellationToken;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn command(mut self, executable: &str, args: &[&str]) -> Self {
        self.config.command = Some(CommandSection {
            executable: executable.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: Default::default(),
            working_directory: None,
            display_name: None,
        });
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        if let Some(cmd) = self.config.command.as_mut() {
            cmd.env.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.config.watch.include.push(pattern.to_string());
        self
    }

    pub fn only_include(mut self, pattern: &str) -> Self {
        self.config.watch.include = vec![pattern.to_string()];
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.watch.debounce_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One prepared reply of a [`StaticFileSetFactory`].
#[derive(Debug, Clone)]
pub enum FactoryAnswer {
    Found(FileSet),
    Missing,
    /// `create` returns an IO error with this message.
    Fail(String),
}

impl From<Option<FileSet>> for FactoryAnswer {
    fn from(answer: Option<FileSet>) -> Self {
        match answer {
            Some(set) => FactoryAnswer::Found(set),
            None => FactoryAnswer::Missing,
        }
    }
}

/// File-set factory that hands out prepared answers.
///
/// Answers are used in order; the last one repeats.
#[derive(Debug, Clone)]
pub struct StaticFileSetFactory {
    answers: Arc<Mutex<VecDeque<FactoryAnswer>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticFileSetFactory {
    pub fn new(file_set: FileSet) -> Self {
        Self::sequence([Some(file_set)])
    }

    /// A factory that never finds anything.
    pub fn empty() -> Self {
        Self::sequence([None])
    }

    /// A factory whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self::answers([FactoryAnswer::Fail(message.to_string())])
    }

    pub fn sequence<I: IntoIterator<Item = Option<FileSet>>>(answers: I) -> Self {
        Self::answers(answers.into_iter().map(FactoryAnswer::from))
    }

    pub fn answers<I: IntoIterator<Item = FactoryAnswer>>(answers: I) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().collect())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_answer(&self) -> FactoryAnswer {
        let mut answers = self.answers.lock().unwrap();
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().cloned()
        };
        answer.unwrap_or(FactoryAnswer::Missing)
    }
}

impl FileSetFactory for StaticFileSetFactory {
    fn create<'a>(&'a self, _cancel: &'a CancellationToken) -> FileSetFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.next_answer();
        Box::pin(async move {
            match answer {
                FactoryAnswer::Found(set) => Ok(Some(set)),
                FactoryAnswer::Missing => Ok(None),
                FactoryAnswer::Fail(message) => {
                    Err(DotwatchError::IoError(io::Error::other(message)))
                }
            }
        })
    }
}
