// src/reporter.rs

//! User-facing status output.
//!
//! The loop reports every transition that matters through a [`Reporter`].
//! Errors, warnings and normal status go through separate channels so callers
//! never have to inspect message text. Diagnostic logging is a separate
//! concern handled by `tracing`.

use std::io::{self, Write};

/// Sink for human-readable status messages.
pub trait Reporter: Send + Sync {
    fn output(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn verbose(&self, message: &str);
}

/// Reporter that prints `dotwatch : <message>` lines.
///
/// Normal output goes to stdout, warnings and errors to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    verbose: bool,
    quiet: bool,
}

impl ConsoleReporter {
    const PREFIX: &'static str = "dotwatch : ";

    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn write_line(mut out: impl Write, message: &str) {
        // A closed terminal is not worth failing the loop over.
        let _ = writeln!(out, "{}{}", Self::PREFIX, message);
    }
}

impl Reporter for ConsoleReporter {
    fn output(&self, message: &str) {
        if !self.quiet {
            Self::write_line(io::stdout().lock(), message);
        }
    }

    fn warn(&self, message: &str) {
        if !self.quiet {
            Self::write_line(io::stderr().lock(), message);
        }
    }

    fn error(&self, message: &str) {
        Self::write_line(io::stderr().lock(), message);
    }

    fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            Self::write_line(io::stdout().lock(), message);
        }
    }
}
