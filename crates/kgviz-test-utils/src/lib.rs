//! Testing utilities for kgviz workspace
//!
//! Shared fixtures: sample Sankey documents, laid-out graphs, scripted
//! sources and execution contexts with unusual scheduling.

#![allow(missing_docs)]

use futures::stream::{self, Stream};
use kgviz_reactive::{ExecutionContext, Work};
use kgviz_sankey::{NodeSpec, RawLink, Rect, SankeyDocument, SankeyGraph, SankeyGraphBuilder};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Small drug-target-disease flow with layout geometry
pub const PATHWAY_JSON: &str = r#"{
    "nodes": [
        {"id": "drug:imatinib", "label": "Imatinib", "x0": 0, "x1": 20, "y0": 0, "y1": 100},
        {"id": "gene:ABL1", "label": "ABL1", "x0": 200, "x1": 220, "y0": 0, "y1": 60},
        {"id": "gene:KIT", "label": "KIT", "x0": 200, "x1": 220, "y0": 80, "y1": 120},
        {"id": "disease:CML", "label": "Chronic myeloid leukemia", "x0": 400, "x1": 420, "y0": 20, "y1": 120}
    ],
    "links": [
        {"source": "drug:imatinib", "target": "gene:ABL1", "value": 6, "width": 60, "y0": 30, "y1": 30},
        {"source": "drug:imatinib", "target": "gene:KIT", "value": 4, "width": 40, "y0": 80, "y1": 100},
        {"source": 1, "target": 3, "value": 6, "width": 60, "y0": 30, "y1": 50},
        {"source": 2, "target": 3, "value": 4, "width": 40, "y0": 100, "y1": 100}
    ]
}"#;

/// Bounding rect of [`PATHWAY_JSON`]
pub const PATHWAY_BOUNDS: Rect = Rect::new(0.0, 420.0, 0.0, 120.0);

pub fn pathway_document() -> SankeyDocument {
    SankeyDocument::from_json_str(PATHWAY_JSON).unwrap()
}

pub fn pathway_graph() -> SankeyGraph {
    let mut graph = pathway_document().resolve().unwrap();
    graph.prepare().unwrap();
    graph
}

/// Graph with `layers[i]` nodes in column `i`, every node linked to every
/// node of the next column
#[allow(clippy::cast_precision_loss)]
pub fn layered_graph(layers: &[usize]) -> SankeyGraph {
    let mut builder = SankeyGraphBuilder::new();
    let mut columns: Vec<Vec<String>> = Vec::new();

    for (column, &count) in layers.iter().enumerate() {
        let x0 = column as f64 * 100.0;
        let ids: Vec<String> = (0..count)
            .map(|row| {
                let id = format!("c{column}r{row}");
                let y0 = row as f64 * 30.0;
                builder.add_node(NodeSpec::new(id.clone()).with_extent(Rect::new(x0, x0 + 10.0, y0, y0 + 20.0)));
                id
            })
            .collect();
        columns.push(ids);
    }

    for pair in columns.windows(2) {
        for source in &pair[0] {
            for target in &pair[1] {
                builder.add_link(RawLink::new(source.as_str(), target.as_str(), 1.0));
            }
        }
    }

    let mut graph = builder.resolve().unwrap();
    graph.prepare().unwrap();
    graph
}

/// Write `json` to `dir/name` and return the path
pub fn write_document(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

/// Stream over `items` that counts how often it is polled for an item
pub fn counted_source<T: Unpin>(items: Vec<T>) -> (impl Stream<Item = T> + Unpin, Arc<AtomicUsize>) {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&polls);
    let mut items = items.into_iter();
    let source = stream::poll_fn(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        std::task::Poll::Ready(items.next())
    });
    (source, polls)
}

/// Context that queues work and runs each batch newest-first on `flush`
#[derive(Default)]
pub struct ReversingContext {
    queue: Mutex<Vec<Work>>,
}

impl ReversingContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run queued work in reverse order; returns how many units ran
    pub fn flush(&self) -> usize {
        let mut batch = std::mem::take(&mut *self.queue.lock());
        let count = batch.len();
        while let Some(work) = batch.pop() {
            work();
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl ExecutionContext for ReversingContext {
    fn run(&self, work: Work) {
        self.queue.lock().push(work);
    }
}

/// Context that runs work inline and counts the units
#[derive(Default)]
pub struct CountingContext {
    runs: AtomicUsize,
}

impl CountingContext {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl ExecutionContext for CountingContext {
    fn run(&self, work: Work) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        work();
    }
}
