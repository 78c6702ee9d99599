//! Error types for the reactive core
//!
//! Source failures are never errors here: they travel inside
//! [`Status::Failed`](crate::Status::Failed). The types below cover the
//! operations that hand failures back to their immediate caller.

use std::time::Duration;

/// Serialized update errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError<E> {
    /// The transform failed; nothing was published
    #[error("update transform failed: {0}")]
    Transform(E),

    /// The spawned update task panicked or was aborted
    #[error("update task aborted: {0}")]
    Aborted(String),
}

impl<E> UpdateError<E> {
    /// Transform error, if that is what failed
    #[inline]
    #[must_use]
    pub fn into_transform(self) -> Option<E> {
        match self {
            Self::Transform(error) => Some(error),
            Self::Aborted(_) => None,
        }
    }
}

/// Errors from [`first_value`](crate::first_value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FirstValueError {
    /// The stream completed without emitting anything
    #[error("stream completed without emitting a value")]
    Empty,
}

/// Deadline errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeadlineError {
    /// The deadline passed before the operation settled
    #[error("deadline of {after:?} elapsed")]
    Elapsed {
        /// Configured deadline
        after: Duration,
    },

    /// The raced task panicked or was aborted
    #[error("deadline task aborted: {0}")]
    Aborted(String),

    /// Called outside a tokio runtime, so no timer or task could be started
    #[error("no tokio runtime available to drive the deadline")]
    NoRuntime,
}

impl DeadlineError {
    /// Check if this is a timeout (as opposed to a task failure)
    #[inline]
    #[must_use]
    pub fn is_elapsed(&self) -> bool {
        matches!(self, Self::Elapsed { .. })
    }
}
