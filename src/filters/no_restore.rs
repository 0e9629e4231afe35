// src/filters/no_restore.rs

use tracing::debug;

use super::WatchFilter;
use crate::context::WatchContext;

/// Flag that skips the package restore on `dotnet run` / `dotnet test`.
pub const NO_RESTORE_FLAG: &str = "--no-restore";

/// Subcommands known to accept [`NO_RESTORE_FLAG`].
const SUPPORTED_COMMANDS: &[&str] = &["run", "test"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Unevaluated,
    Eligible { augmented: Vec<String> },
    Ineligible,
}

/// Adds `--no-restore` on restarts when nothing structural changed.
///
/// Eligibility is a property of the original command shape, so it is decided
/// once on the first iteration. Whether to apply the flag is decided again on
/// every later iteration: a project file change means a restore is needed.
///
/// The cached list is built from the arguments this filter sees on iteration
/// 0 and replaces the arguments wholesale on restarts. Put it first in the
/// pipeline to work from the caller's original list.
#[derive(Debug, Clone)]
pub struct NoRestoreFilter {
    state: State,
}

impl NoRestoreFilter {
    pub fn new() -> Self {
        Self {
            state: State::Unevaluated,
        }
    }

    pub fn is_eligible(&self) -> Option<bool> {
        match self.state {
            State::Unevaluated => None,
            State::Eligible { .. } => Some(true),
            State::Ineligible => Some(false),
        }
    }

    /// Cached argument list used on restarts, once decided eligible.
    pub fn augmented_arguments(&self) -> Option<&[String]> {
        match &self.state {
            State::Eligible { augmented } => Some(augmented),
            _ => None,
        }
    }

    fn evaluate(arguments: &[String]) -> State {
        if !can_use_no_restore(arguments) {
            return State::Ineligible;
        }

        let mut augmented = Vec::with_capacity(arguments.len() + 1);
        augmented.extend(arguments.iter().take(1).cloned());
        augmented.push(NO_RESTORE_FLAG.to_string());
        augmented.extend(arguments.iter().skip(1).cloned());
        State::Eligible { augmented }
    }
}

impl Default for NoRestoreFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchFilter for NoRestoreFilter {
    fn apply(&mut self, context: &mut WatchContext) {
        if context.iteration == 0 {
            // Re-evaluating on a repeated iteration-0 call keeps this idempotent.
            self.state = Self::evaluate(&context.process_spec.arguments);
            debug!(eligible = ?self.is_eligible(), "evaluated {NO_RESTORE_FLAG} eligibility");
            return;
        }

        if let State::Eligible { augmented } = &self.state {
            if !context.requires_file_set_reevaluation {
                context.process_spec.arguments = augmented.clone();
            }
        }
    }
}

/// The first argument selects the subcommand; the executable name plays no
/// part in the decision.
fn can_use_no_restore(arguments: &[String]) -> bool {
    if arguments.iter().any(|a| a == NO_RESTORE_FLAG) {
        return false;
    }

    arguments
        .first()
        .is_some_and(|cmd| SUPPORTED_COMMANDS.contains(&cmd.as_str()))
}
