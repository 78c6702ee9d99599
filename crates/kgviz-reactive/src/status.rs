//! Status snapshots for asynchronous sources
//!
//! Wraps any fallible stream so consumers never branch on "still loading":
//! the output always starts with [`Status::Loading`], then carries one
//! [`Status::Ready`] per source value, and ends after the first
//! [`Status::Failed`].

use futures::stream::{FusedStream, Stream, StreamExt};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Point-in-time state of an asynchronous operation
///
/// The three variants are mutually exclusive, so a snapshot can never carry
/// both a value and an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status<T, E> {
    /// Subscribed, nothing received yet
    Loading,

    /// The source emitted a value
    Ready(T),

    /// The source failed (terminal)
    Failed(E),
}

impl<T, E> Status<T, E> {
    /// Check if this is the initial loading snapshot
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if this snapshot carries a value
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Check if this snapshot carries an error
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Value, if present
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Error, if present
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Borrow the payload
    #[inline]
    pub fn as_ref(&self) -> Status<&T, &E> {
        match self {
            Self::Loading => Status::Loading,
            Self::Ready(value) => Status::Ready(value),
            Self::Failed(error) => Status::Failed(error),
        }
    }

    /// Map the value, keeping loading and error snapshots as they are
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Status<U, E> {
        match self {
            Self::Loading => Status::Loading,
            Self::Ready(value) => Status::Ready(f(value)),
            Self::Failed(error) => Status::Failed(error),
        }
    }

    /// Map the error, keeping loading and value snapshots as they are
    #[inline]
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Status<T, F> {
        match self {
            Self::Loading => Status::Loading,
            Self::Ready(value) => Status::Ready(value),
            Self::Failed(error) => Status::Failed(f(error)),
        }
    }

    /// Convert a settled snapshot back into a `Result`
    ///
    /// Returns `None` for [`Status::Loading`].
    #[inline]
    pub fn into_result(self) -> Option<Result<T, E>> {
        match self {
            Self::Loading => None,
            Self::Ready(value) => Some(Ok(value)),
            Self::Failed(error) => Some(Err(error)),
        }
    }
}

impl<T, E> Default for Status<T, E> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T, E> From<Result<T, E>> for Status<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Serializes to the flat UI shape `{"loading": bool, "value"?: T, "error"?: E}`
impl<T: Serialize, E: Serialize> Serialize for Status<T, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Loading => {
                let mut state = serializer.serialize_struct("Status", 1)?;
                state.serialize_field("loading", &true)?;
                state.end()
            }
            Self::Ready(value) => {
                let mut state = serializer.serialize_struct("Status", 2)?;
                state.serialize_field("loading", &false)?;
                state.serialize_field("value", value)?;
                state.end()
            }
            Self::Failed(error) => {
                let mut state = serializer.serialize_struct("Status", 2)?;
                state.serialize_field("loading", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

/// Stream returned by [`with_status`]
#[derive(Debug)]
#[must_use = "streams do nothing unless polled"]
pub struct WithStatus<S> {
    /// `None` once the source completed or failed
    source: Option<S>,
    started: bool,
}

/// Wrap a fallible stream into a stream of [`Status`] snapshots
///
/// The first poll yields [`Status::Loading`] without touching the source.
/// The source is dropped as soon as it fails or completes.
pub fn with_status<S, T, E>(source: S) -> WithStatus<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    WithStatus {
        source: Some(source),
        started: false,
    }
}

impl<S, T, E> Stream for WithStatus<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    type Item = Status<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if !this.started {
            this.started = true;
            tracing::trace!("status: loading");
            return Poll::Ready(Some(Status::Loading));
        }

        let Some(source) = this.source.as_mut() else {
            return Poll::Ready(None);
        };

        match ready!(source.poll_next_unpin(cx)) {
            Some(Ok(value)) => {
                tracing::trace!("status: ready");
                Poll::Ready(Some(Status::Ready(value)))
            }
            Some(Err(error)) => {
                tracing::trace!("status: failed");
                this.source = None;
                Poll::Ready(Some(Status::Failed(error)))
            }
            None => {
                tracing::trace!("status: source completed");
                this.source = None;
                Poll::Ready(None)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending_loading = usize::from(!self.started);
        match &self.source {
            Some(source) => {
                let (lower, upper) = source.size_hint();
                (
                    lower.saturating_add(pending_loading),
                    upper.and_then(|upper| upper.checked_add(pending_loading)),
                )
            }
            None => (pending_loading, Some(pending_loading)),
        }
    }
}

impl<S, T, E> FusedStream for WithStatus<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.started && self.source.is_none()
    }
}

/// Extension trait adding [`with_status`] as a method
pub trait StatusExt: Stream {
    /// Wrap this stream into a stream of [`Status`] snapshots
    fn with_status<T, E>(self) -> WithStatus<Self>
    where
        Self: Stream<Item = Result<T, E>> + Sized + Unpin,
    {
        with_status(self)
    }
}

impl<S: Stream + ?Sized> StatusExt for S {}
