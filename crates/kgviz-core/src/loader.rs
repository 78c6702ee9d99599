//! Status-tracked graph loading
//!
//! A [`GraphLoader`] fetches a Sankey document from a [`DocumentSource`],
//! resolves and prepares it, and exposes the outcome either directly or as
//! a stream of [`Status`] snapshots for a UI to render.

use crate::error::{KgvizError, Result};
use futures::stream::{self, BoxStream, StreamExt};
use kgviz_reactive::{first_value, with_deadline, with_status, SharedValue, Status, WithStatus};
use kgviz_sankey::{SankeyDocument, SankeyGraph};
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for a single load
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Snapshot type published to shared graph holders
pub type GraphStatus = Status<Arc<SankeyGraph>, Arc<KgvizError>>;

/// Where document text comes from
///
/// Implement this trait to load graphs from somewhere other than the local
/// filesystem.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the raw JSON text at `location`
    async fn fetch(&self, location: &str) -> Result<String>;
}

/// Reads documents from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

#[async_trait::async_trait]
impl DocumentSource for FileSource {
    async fn fetch(&self, location: &str) -> Result<String> {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|e| KgvizError::io(location, e))
    }
}

/// Loads and prepares Sankey graphs under a deadline
#[derive(Clone)]
pub struct GraphLoader {
    source: Arc<dyn DocumentSource>,
    timeout: Duration,
}

impl GraphLoader {
    /// Create a loader reading from the filesystem
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: Arc::new(FileSource),
            timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    /// With a different document source
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn DocumentSource>) -> Self {
        self.source = source;
        self
    }

    /// With load deadline
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured deadline
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch, parse, resolve and prepare a graph
    ///
    /// A fetch that outlives the deadline keeps running in the background;
    /// its result is discarded.
    ///
    /// # Errors
    /// - `KgvizError::Deadline` if the fetch misses the deadline, or with
    ///   `DeadlineError::NoRuntime` when polled outside a tokio runtime
    /// - `KgvizError::Io`, `Document` or `Resolution` from the steps themselves
    pub async fn load(&self, location: &str) -> Result<SankeyGraph> {
        let source = Arc::clone(&self.source);
        let owned = location.to_string();
        let text = with_deadline(self.timeout, async move { source.fetch(&owned).await }).await??;

        let mut graph = SankeyDocument::from_json_str(&text)?.resolve()?;
        graph.prepare()?;

        tracing::info!(
            location,
            nodes = graph.node_count(),
            links = graph.link_count(),
            "graph loaded"
        );
        Ok(graph)
    }

    /// Load as a snapshot stream: `Loading`, then `Ready` or `Failed`
    ///
    /// Nothing is fetched until the stream is polled past its first item.
    /// Any executor may drive the stream; without a tokio runtime the load
    /// settles as `Failed` with `DeadlineError::NoRuntime`.
    pub fn load_status(&self, location: &str) -> WithStatus<BoxStream<'static, Result<SankeyGraph>>> {
        let loader = self.clone();
        let location = location.to_string();
        let source = stream::once(async move { loader.load(&location).await }).boxed();
        with_status(source)
    }

    /// Wait for the first settled snapshot of [`load_status`](Self::load_status)
    ///
    /// # Errors
    /// - The load failure as described on [`load`](Self::load)
    /// - `KgvizError::FirstValue` if nothing settled
    pub async fn load_settled(&self, location: &str) -> Result<SankeyGraph> {
        let settled = first_value(
            self.load_status(location)
                .filter(|snapshot| futures::future::ready(!snapshot.is_loading())),
        )
        .await?;
        match settled.into_result() {
            Some(result) => result,
            None => Err(kgviz_reactive::FirstValueError::Empty.into()),
        }
    }

    /// Publish every snapshot of a load into `store`
    ///
    /// Returns the final snapshot. Failures are published as `Failed`
    /// snapshots, never returned. Each publish goes through
    /// [`SharedValue::update_with`], so dropping this future may leave the
    /// store at `Loading`. Callers that must see the load settle, such as a
    /// view that owns the store, should spawn the refresh or publish through
    /// [`SharedValue::spawn_update`].
    pub async fn refresh(&self, location: &str, store: &SharedValue<GraphStatus>) -> GraphStatus {
        let mut snapshots = self.load_status(location);
        let mut last = GraphStatus::Loading;
        while let Some(snapshot) = snapshots.next().await {
            let snapshot = snapshot.map(Arc::new).map_err(Arc::new);
            last = store.update_with(|_| snapshot).await;
        }
        last
    }
}

impl Default for GraphLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphLoader")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
