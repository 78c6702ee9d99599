//! kgviz Sankey Model
//!
//! Sankey nodes and links, two-phase link resolution, and the geometry
//! queries a renderer needs (bounding rect, hit testing).
//!
//! # Core Concepts
//!
//! - [`Rect`] / [`bounding_rect`]: axis-aligned boxes and their union
//! - [`SankeyGraphBuilder`]: collects nodes and raw links
//! - [`SankeyGraph`]: resolved graph; every link endpoint is a valid node index
//! - [`SankeyDocument`]: the JSON `{nodes, links}` form
//!
//! # Example
//!
//! ```rust
//! use kgviz_sankey::{NodeSpec, RawLink, Rect, SankeyGraphBuilder};
//!
//! let mut builder = SankeyGraphBuilder::new();
//! builder.add_node(NodeSpec::new("a").with_extent(Rect::new(0.0, 10.0, 0.0, 20.0)));
//! builder.add_node(NodeSpec::new("b").with_extent(Rect::new(50.0, 60.0, 0.0, 20.0)));
//! builder.add_link(RawLink::new("a", "b", 1.0).with_geometry(20.0, 10.0, 10.0));
//!
//! let mut graph = builder.resolve().unwrap();
//! graph.prepare().unwrap();
//!
//! assert_eq!(graph.bounding_rect(), Rect::new(0.0, 60.0, 0.0, 20.0));
//! assert_eq!(graph.node_at(55.0, 5.0).map(|n| n.id.as_str()), Some("b"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod builder;
mod document;
mod error;
mod geometry;
mod graph;
mod model;

// Re-exports
pub use builder::SankeyGraphBuilder;
pub use document::SankeyDocument;
pub use error::{DocumentError, ResolutionError};
pub use geometry::{bounding_rect, HasExtent, Rect};
pub use graph::SankeyGraph;
pub use model::{NodeRef, NodeSpec, NumericRefs, RawLink, SankeyLink, SankeyNode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for Sankey graphs
    pub use crate::{
        bounding_rect, HasExtent, NodeRef, NodeSpec, RawLink, Rect, SankeyDocument, SankeyGraph,
        SankeyGraphBuilder,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
