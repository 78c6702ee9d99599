//! Context-rebinding adapter
//!
//! Re-dispatches every notification of a stream (value, error, completion)
//! through an [`ExecutionContext`], so observer code runs where the UI host
//! expects it to run. Notifications are sequence-numbered and re-ordered on
//! the receiving side, which keeps source order even when the context runs
//! units of work out of order.

use futures::channel::mpsc;
use futures::stream::{FusedStream, Stream, StreamExt, TryStream, TryStreamExt};
use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;

/// Default number of notifications that may be in flight on the context
pub const DEFAULT_DISPATCH_WINDOW: usize = 16;

/// Unit of work handed to an [`ExecutionContext`]
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a unit of work "inside" itself
///
/// Implementations may run work immediately, later, or out of order.
pub trait ExecutionContext: Send + Sync {
    /// Run (or schedule) a unit of work
    fn run(&self, work: Work);
}

impl<C: ExecutionContext + ?Sized> ExecutionContext for Arc<C> {
    fn run(&self, work: Work) {
        (**self).run(work);
    }
}

/// Runs work immediately on the calling task
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineContext;

impl ExecutionContext for InlineContext {
    fn run(&self, work: Work) {
        work();
    }
}

/// Spawns each unit of work on a tokio runtime
///
/// On a multi-threaded runtime, units may run concurrently and out of order.
#[derive(Debug, Clone)]
pub struct TokioContext {
    handle: Handle,
}

impl TokioContext {
    /// Create a context on the given runtime
    #[inline]
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a context on the current runtime
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[inline]
    #[must_use]
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl ExecutionContext for TokioContext {
    fn run(&self, work: Work) {
        drop(self.handle.spawn(async move { work() }));
    }
}

/// Notification of a stream, as delivered through the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<T, E> {
    /// Source emitted a value
    Next(T),
    /// Source failed (terminal)
    Error(E),
    /// Source completed (terminal)
    Complete,
}

impl<T, E> Notification<T, E> {
    /// Check if this notification ends the stream
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Next(_))
    }
}

/// Stream returned by [`on_context`]
#[must_use = "streams do nothing unless polled"]
pub struct OnContext<S: TryStream, C> {
    source: Option<S>,
    context: C,
    sender: mpsc::UnboundedSender<(u64, Notification<S::Ok, S::Error>)>,
    receiver: mpsc::UnboundedReceiver<(u64, Notification<S::Ok, S::Error>)>,
    /// Sequence number for the next dispatched notification
    dispatched: u64,
    /// Sequence number the consumer expects next
    delivered: u64,
    /// Notifications that arrived ahead of `delivered`
    reorder: BTreeMap<u64, Notification<S::Ok, S::Error>>,
    window: usize,
    done: bool,
}

/// Re-dispatch every notification of `source` through `context`
pub fn on_context<S, C>(context: C, source: S) -> OnContext<S, C>
where
    S: TryStream + Unpin,
    S::Ok: Send + 'static,
    S::Error: Send + 'static,
    C: ExecutionContext,
{
    let (sender, receiver) = mpsc::unbounded();
    OnContext {
        source: Some(source),
        context,
        sender,
        receiver,
        dispatched: 0,
        delivered: 0,
        reorder: BTreeMap::new(),
        window: DEFAULT_DISPATCH_WINDOW,
        done: false,
    }
}

impl<S: TryStream, C> OnContext<S, C> {
    /// Limit how many notifications may be in flight on the context
    ///
    /// A window of 1 hands one notification at a time to the context.
    #[inline]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    /// Notifications handed to the context but not yet yielded
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> usize {
        usize::try_from(self.dispatched - self.delivered).unwrap_or(usize::MAX)
    }

    fn finish(&mut self) {
        self.done = true;
        self.source = None;
        self.reorder.clear();
        self.receiver.close();
    }
}

impl<S, C> OnContext<S, C>
where
    S: TryStream,
    S::Ok: Send + 'static,
    S::Error: Send + 'static,
    C: ExecutionContext,
{
    fn dispatch(&mut self, notification: Notification<S::Ok, S::Error>) {
        let seq = self.dispatched;
        self.dispatched += 1;
        tracing::trace!(seq, terminal = notification.is_terminal(), "context: dispatch");

        let sender = self.sender.clone();
        self.context.run(Box::new(move || {
            // Closed receiver means the consumer went away; drop silently.
            let _ = sender.unbounded_send((seq, notification));
        }));
    }
}

impl<S, C> Stream for OnContext<S, C>
where
    S: TryStream + Unpin,
    S::Ok: Send + 'static,
    S::Error: Send + 'static,
    C: ExecutionContext + Unpin,
{
    type Item = Result<S::Ok, S::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            if let Some(notification) = this.reorder.remove(&this.delivered) {
                this.delivered += 1;
                return match notification {
                    Notification::Next(value) => Poll::Ready(Some(Ok(value))),
                    Notification::Error(error) => {
                        this.finish();
                        Poll::Ready(Some(Err(error)))
                    }
                    Notification::Complete => {
                        this.finish();
                        Poll::Ready(None)
                    }
                };
            }

            match this.receiver.poll_next_unpin(cx) {
                Poll::Ready(Some((seq, notification))) => {
                    this.reorder.insert(seq, notification);
                    continue;
                }
                // We hold a sender, so the channel cannot close under us.
                Poll::Ready(None) => {
                    this.finish();
                    return Poll::Ready(None);
                }
                Poll::Pending => {}
            }

            if this.in_flight() >= this.window {
                return Poll::Pending;
            }

            let Some(source) = this.source.as_mut() else {
                return Poll::Pending;
            };

            match source.try_poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(value))) => this.dispatch(Notification::Next(value)),
                Poll::Ready(Some(Err(error))) => {
                    this.source = None;
                    this.dispatch(Notification::Error(error));
                }
                Poll::Ready(None) => {
                    this.source = None;
                    this.dispatch(Notification::Complete);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S, C> FusedStream for OnContext<S, C>
where
    S: TryStream + Unpin,
    S::Ok: Send + 'static,
    S::Error: Send + 'static,
    C: ExecutionContext + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl<S: TryStream, C> std::fmt::Debug for OnContext<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnContext")
            .field("dispatched", &self.dispatched)
            .field("delivered", &self.delivered)
            .field("window", &self.window)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Extension trait adding [`on_context`] as a method
pub trait ContextExt: TryStream {
    /// Re-dispatch every notification of this stream through `context`
    fn on_context<C>(self, context: C) -> OnContext<Self, C>
    where
        Self: Sized + Unpin,
        Self::Ok: Send + 'static,
        Self::Error: Send + 'static,
        C: ExecutionContext,
    {
        on_context(context, self)
    }
}

impl<S: TryStream + ?Sized> ContextExt for S {}
