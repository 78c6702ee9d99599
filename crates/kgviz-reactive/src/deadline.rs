//! Race-based deadlines for futures

use crate::error::DeadlineError;
use std::future::Future;
use std::time::Duration;

/// Race `future` against a timer of length `after`
///
/// The future runs on a spawned task. When the deadline wins, the task is
/// detached rather than aborted: the operation keeps running in the
/// background and its result is discarded.
///
/// # Errors
/// - `DeadlineError::Elapsed` if the timer fires first
/// - `DeadlineError::Aborted` if the task panics
/// - `DeadlineError::NoRuntime` if polled outside a tokio runtime; the
///   future is dropped without running
pub async fn with_deadline<F>(after: Duration, future: F) -> Result<F::Output, DeadlineError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handle = current_runtime()?;
    let mut task = handle.spawn(future);

    tokio::select! {
        joined = &mut task => joined.map_err(|e| DeadlineError::Aborted(e.to_string())),
        () = tokio::time::sleep(after) => {
            tracing::warn!(?after, "deadline elapsed, operation left running");
            Err(DeadlineError::Elapsed { after })
        }
    }
}

/// Race `future` against a timer, dropping the future if the timer wins
///
/// # Errors
/// - `DeadlineError::Elapsed` if the timer fires first
/// - `DeadlineError::NoRuntime` if polled outside a tokio runtime
pub async fn with_deadline_cancel<F>(after: Duration, future: F) -> Result<F::Output, DeadlineError>
where
    F: Future,
{
    current_runtime()?;
    tokio::time::timeout(after, future).await.map_err(|_| {
        tracing::warn!(?after, "deadline elapsed, operation cancelled");
        DeadlineError::Elapsed { after }
    })
}

fn current_runtime() -> Result<tokio::runtime::Handle, DeadlineError> {
    tokio::runtime::Handle::try_current().map_err(|_| {
        tracing::warn!("deadline requested outside a tokio runtime");
        DeadlineError::NoRuntime
    })
}
