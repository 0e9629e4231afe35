// src/engine/race.rs

//! "Wait for the first of N, then cancel and await all N."

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{DotwatchError, Result};

/// Which signal settled first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    First,
    Second,
    /// The external token fired. Checked before the operations, so it also
    /// wins ties.
    Cancelled,
}

/// Results of both operations after the mandatory join.
///
/// A side is `None` when it failed after losing the race; those failures are
/// teardown noise and only logged.
#[derive(Debug)]
pub struct RaceOutcome<A, B> {
    pub winner: Winner,
    pub first: Option<A>,
    pub second: Option<B>,
}

/// Spawn `first` and `second`, wait until one of them or `external` settles,
/// then cancel `scope` and wait for both operations to finish.
///
/// `scope` must be the token both operations observe (usually a child of
/// `external`), so cancelling it bounds the join. An error from the winning
/// operation is returned; errors from the losing side are swallowed.
pub async fn race_then_join<A, B, FA, FB>(
    external: &CancellationToken,
    scope: &CancellationToken,
    first: FA,
    second: FB,
) -> Result<RaceOutcome<A, B>>
where
    A: Send + 'static,
    B: Send + 'static,
    FA: Future<Output = Result<A>> + Send + 'static,
    FB: Future<Output = Result<B>> + Send + 'static,
{
    let mut first_task = tokio::spawn(first);
    let mut second_task = tokio::spawn(second);
    let mut first_done = None;
    let mut second_done = None;

    let winner = tokio::select! {
        biased;
        _ = external.cancelled() => Winner::Cancelled,
        res = &mut first_task => {
            first_done = Some(res);
            Winner::First
        }
        res = &mut second_task => {
            second_done = Some(res);
            Winner::Second
        }
    };

    // Tear down whichever side is still running before looking at results.
    scope.cancel();

    let first_res = settle(first_done, first_task).await;
    let second_res = settle(second_done, second_task).await;

    Ok(RaceOutcome {
        winner,
        first: keep_or_swallow(first_res, winner == Winner::First, "first")?,
        second: keep_or_swallow(second_res, winner == Winner::Second, "second")?,
    })
}

async fn settle<T>(
    done: Option<std::result::Result<Result<T>, tokio::task::JoinError>>,
    task: JoinHandle<Result<T>>,
) -> Result<T> {
    let joined = match done {
        Some(res) => res,
        None => task.await,
    };

    match joined {
        Ok(res) => res,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => Err(DotwatchError::Join(err)),
    }
}

fn keep_or_swallow<T>(res: Result<T>, won: bool, side: &str) -> Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(err) if won => Err(err),
        Err(err) => {
            debug!(side, error = %err, "ignoring error from cancelled operation");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn first_to_finish_wins_and_loser_is_cancelled() {
        let external = CancellationToken::new();
        let scope = external.child_token();

        let loser_scope = scope.clone();
        let outcome = race_then_join(
            &external,
            &scope,
            async { Ok(7) },
            async move {
                loser_scope.cancelled().await;
                Ok("torn down")
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.winner, Winner::First);
        assert_eq!(outcome.first, Some(7));
        assert_eq!(outcome.second, Some("torn down"));
        assert!(!external.is_cancelled());
    }

    #[tokio::test]
    async fn external_cancellation_wins_ties() {
        let external = CancellationToken::new();
        let scope = external.child_token();
        external.cancel();

        let outcome = race_then_join(&external, &scope, async { Ok(1) }, async { Ok(2) })
            .await
            .unwrap();

        assert_eq!(outcome.winner, Winner::Cancelled);
    }

    #[tokio::test]
    async fn loser_errors_are_swallowed() {
        let external = CancellationToken::new();
        let scope = external.child_token();
        let loser_scope = scope.clone();

        let outcome: RaceOutcome<u8, u8> = race_then_join(
            &external,
            &scope,
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(1)
            },
            async move {
                loser_scope.cancelled().await;
                Err(DotwatchError::ConfigError("teardown".into()))
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.winner, Winner::First);
        assert!(outcome.second.is_none());
    }

    #[tokio::test]
    async fn winner_error_propagates() {
        let external = CancellationToken::new();
        let scope = external.child_token();
        let loser_scope = scope.clone();

        let res: Result<RaceOutcome<u8, u8>> = race_then_join(
            &external,
            &scope,
            async { Err(DotwatchError::ConfigError("spawn failed".into())) },
            async move {
                loser_scope.cancelled().await;
                Ok(0)
            },
        )
        .await;

        assert!(matches!(res, Err(DotwatchError::ConfigError(_))));
    }
}
