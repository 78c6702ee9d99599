//! Shared value holder with serialized read-modify-write updates
//!
//! A [`SharedValue`] is a single cell visible to many asynchronous updaters.
//! Every update takes the holder's update lock, reads the current value,
//! awaits the transform and publishes the result before the next update may
//! read. Callers do not need to chain their calls for this to hold.
//!
//! There are two ways to run an update, and they differ in cancellation:
//!
//! - [`SharedValue::update`] and [`SharedValue::update_with`] run inside the
//!   caller's future. Dropping that future abandons the update without
//!   publishing, which suits callers that own their own cancellation.
//! - [`SharedValue::spawn_update`] moves the update onto a tokio task. Once
//!   started it cannot be cancelled and always completes its write. UI-facing
//!   state, where a torn-down view must not leave a half-applied change
//!   behind, should go through this variant.

use crate::error::UpdateError;
use futures::stream::{self, Stream};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Shared mutable cell with serialized updates
///
/// Cloning yields another handle to the same cell.
#[derive(Debug)]
pub struct SharedValue<V> {
    inner: Arc<Inner<V>>,
}

#[derive(Debug)]
struct Inner<V> {
    /// Publishes every new value to subscribers
    publisher: watch::Sender<V>,
    /// Held for the whole read-transform-publish cycle
    update_lock: Mutex<()>,
    /// Number of publishes since creation
    version: AtomicU64,
}

impl<V> Clone for SharedValue<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> SharedValue<V> {
    /// Create a holder with an initial value
    #[must_use]
    pub fn new(initial: V) -> Self {
        let (publisher, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                publisher,
                update_lock: Mutex::new(()),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Clone of the current value
    #[inline]
    #[must_use]
    pub fn get(&self) -> V {
        self.inner.publisher.borrow().clone()
    }

    /// Number of values published since creation
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Apply an asynchronous, fallible transform to the current value
    ///
    /// The read, the transform and the publish happen under the update lock,
    /// so concurrent callers queue (FIFO) instead of racing.
    ///
    /// Dropping the returned future before it completes releases the lock
    /// without publishing anything.
    ///
    /// # Errors
    /// - `UpdateError::Transform` if the transform fails; the holder is unchanged
    pub async fn update<F, Fut, E>(&self, transform: F) -> Result<V, UpdateError<E>>
    where
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let _guard = self.inner.update_lock.lock().await;
        let current = self.get();
        tracing::debug!(version = self.version(), "shared value: update read");

        let next = match transform(current).await {
            Ok(next) => next,
            Err(error) => {
                tracing::debug!(version = self.version(), "shared value: transform failed");
                return Err(UpdateError::Transform(error));
            }
        };

        self.publish(next.clone());
        Ok(next)
    }

    /// Apply a synchronous, infallible transform to the current value
    pub async fn update_with<F>(&self, transform: F) -> V
    where
        F: FnOnce(&V) -> V,
    {
        let _guard = self.inner.update_lock.lock().await;
        let next = transform(&self.inner.publisher.borrow());
        self.publish(next.clone());
        next
    }

    /// Overwrite the value without taking the update lock
    ///
    /// Bypasses serialization; meant for initialisation and tests.
    pub fn replace(&self, value: V) -> V {
        let previous = self.inner.publisher.send_replace(value);
        self.inner.version.fetch_add(1, Ordering::AcqRel);
        previous
    }

    /// Stream of published values, starting with the current one
    ///
    /// Follows "latest value" semantics: a slow subscriber may skip
    /// intermediate values but always observes the newest. The stream ends
    /// once every handle to the holder has been dropped.
    pub fn subscribe(&self) -> impl Stream<Item = V> + Send + 'static
    where
        V: Send + Sync + 'static,
    {
        let receiver = self.inner.publisher.subscribe();
        stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first {
                receiver.changed().await.ok()?;
            }
            let value = receiver.borrow_and_update().clone();
            Some((value, (receiver, false)))
        })
    }

    fn publish(&self, value: V) {
        self.inner.publisher.send_replace(value);
        let version = self.inner.version.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(version, "shared value: published");
    }
}

impl<V> SharedValue<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Run [`update`](Self::update) on a spawned task
    ///
    /// Once started, the update always completes its write, even if the
    /// returned handle is dropped. Must be called inside a tokio runtime.
    pub fn spawn_update<F, Fut, E>(&self, transform: F) -> UpdateHandle<V, E>
    where
        F: FnOnce(V) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Send + 'static,
    {
        let holder = self.clone();
        let task = tokio::spawn(async move { holder.update(transform).await });
        UpdateHandle { task }
    }
}

impl<V: Clone + Default> Default for SharedValue<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

/// Handle to an update started by [`SharedValue::spawn_update`]
///
/// Awaiting it yields the update's result; dropping it detaches the update,
/// which still runs to completion.
#[derive(Debug)]
#[must_use = "dropping the handle detaches the update; await it to observe the result"]
pub struct UpdateHandle<V, E> {
    task: JoinHandle<Result<V, UpdateError<E>>>,
}

impl<V, E> Future for UpdateHandle<V, E> {
    type Output = Result<V, UpdateError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(Pin::new(&mut self.task).poll(cx)) {
            Ok(result) => Poll::Ready(result),
            Err(join_error) => Poll::Ready(Err(UpdateError::Aborted(join_error.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::first_value;
    use futures::future::ready as ready_future;
    use std::time::Duration;

    #[tokio::test]
    async fn chained_updates_observe_previous_write() {
        let holder = SharedValue::new(0u32);

        let first = holder.update(|v| ready_future(Ok::<_, ()>(v + 1))).await;
        assert_eq!(first, Ok(1));

        let mut observed = None;
        let second = holder
            .update(|v| {
                observed = Some(v);
                ready_future(Ok::<_, ()>(v + 1))
            })
            .await;

        assert_eq!(second, Ok(2));
        assert_eq!(observed, Some(1));
        assert_eq!(holder.get(), 2);
        assert_eq!(holder.version(), 2);
    }

    #[tokio::test]
    async fn failed_transform_leaves_holder_unchanged() {
        let holder = SharedValue::new(vec!["a".to_string()]);

        let result = holder
            .update(|_| ready_future(Err::<Vec<String>, _>("rejected")))
            .await;

        assert_eq!(result, Err(UpdateError::Transform("rejected")));
        assert_eq!(holder.get(), vec!["a".to_string()]);
        assert_eq!(holder.version(), 0);
    }

    #[tokio::test]
    async fn async_transform_is_awaited_before_publish() {
        let holder = SharedValue::new(10i64);

        let result = holder
            .update(|v| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, ()>(v * 3)
            })
            .await;

        assert_eq!(result, Ok(30));
        assert_eq!(holder.get(), 30);
    }

    #[tokio::test]
    async fn update_with_applies_sync_transform() {
        let holder = SharedValue::new(vec![1, 2]);
        let next = holder
            .update_with(|v| {
                let mut v = v.clone();
                v.push(3);
                v
            })
            .await;
        assert_eq!(next, vec![1, 2, 3]);
        assert_eq!(holder.get(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn subscribe_starts_with_current_value() {
        let holder = SharedValue::new("initial".to_string());
        let current = first_value(holder.subscribe()).await;
        assert_eq!(current.as_deref(), Ok("initial"));
    }

    #[tokio::test]
    async fn dropped_update_publishes_nothing() {
        let holder = SharedValue::new(1u8);

        {
            let pending = holder.update(|v| async move {
                futures::future::pending::<()>().await;
                Ok::<_, ()>(v + 1)
            });
            let timed_out = tokio::time::timeout(Duration::from_millis(5), pending).await;
            assert!(timed_out.is_err());
        }

        assert_eq!(holder.get(), 1);
        let next = holder.update(|v| ready_future(Ok::<_, ()>(v + 1))).await;
        assert_eq!(next, Ok(2));
    }

    #[tokio::test]
    async fn spawned_update_completes_after_handle_dropped() {
        let holder = SharedValue::new(0u32);
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();

        let handle = holder.spawn_update(move |v| async move {
            let _ = started_tx.send(());
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, ()>(v + 5)
        });
        started_rx.await.unwrap();
        drop(handle);

        let after = holder.update(|v| ready_future(Ok::<_, ()>(v))).await;
        assert_eq!(after, Ok(5));
    }

    #[tokio::test]
    async fn spawned_update_reports_result() {
        let holder = SharedValue::new(2u32);
        let result = holder
            .spawn_update(|v| async move { Ok::<_, String>(v * 10) })
            .await;
        assert_eq!(result, Ok(20));
    }
}
