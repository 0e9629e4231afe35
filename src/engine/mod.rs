// src/engine/mod.rs

//! Orchestration engine.
//!
//! - [`watch_loop`] owns the per-iteration state machine: prepare, run,
//!   race, clean up, branch.
//! - [`race`] is the reusable "first of N wins, then cancel and join all N"
//!   helper the loop is built on.

pub mod race;
pub mod watch_loop;

pub use race::{RaceOutcome, Winner, race_then_join};
pub use watch_loop::{ITERATION_ENV_VAR, LoopExit, WATCH_ENV_VAR, WatchLoop};
