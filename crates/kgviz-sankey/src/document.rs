//! JSON Sankey document

use crate::builder::SankeyGraphBuilder;
use crate::error::{DocumentError, ResolutionError};
use crate::graph::SankeyGraph;
use crate::model::{NodeSpec, NumericRefs, RawLink};
use serde::{Deserialize, Serialize};

/// Serialized Sankey graph: `{"nodes": [...], "links": [...]}`
///
/// Link endpoints are raw [`NodeRef`](crate::NodeRef)s; nothing is checked
/// until [`resolve`](Self::resolve).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SankeyDocument {
    /// Nodes in order
    pub nodes: Vec<NodeSpec>,
    /// Links with unresolved endpoints
    #[serde(default)]
    pub links: Vec<RawLink>,
    /// How numeric endpoints are read
    #[serde(default, rename = "numericRefs")]
    pub numeric_refs: NumericRefs,
}

impl SankeyDocument {
    /// Parse a document from JSON
    ///
    /// # Errors
    /// - `DocumentError::Parse` if the JSON is malformed
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// - `DocumentError::NonFinite` if a coordinate, value or width is NaN
    ///   or infinite; JSON would write it as `null` and fail to read it back
    pub fn to_json(&self) -> Result<String, DocumentError> {
        self.check_finite()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check_finite(&self) -> Result<(), DocumentError> {
        for (i, node) in self.nodes.iter().enumerate() {
            let fields = [("x0", node.x0), ("x1", node.x1), ("y0", node.y0), ("y1", node.y1)];
            for (name, value) in fields.into_iter().chain(node.fixed_value.map(|v| ("fixedValue", v))) {
                finite(value, || format!("nodes[{i}].{name}"))?;
            }
        }
        for (i, link) in self.links.iter().enumerate() {
            let fields = [("value", link.value), ("width", link.width), ("y0", link.y0), ("y1", link.y1)];
            for (name, value) in fields {
                finite(value, || format!("links[{i}].{name}"))?;
            }
        }
        Ok(())
    }

    /// Resolve into a graph using the document's numeric-ref mode
    ///
    /// # Errors
    /// - Any [`ResolutionError`] from [`SankeyGraphBuilder::resolve`]
    pub fn resolve(self) -> Result<SankeyGraph, ResolutionError> {
        let numeric_refs = self.numeric_refs;
        self.resolve_with(numeric_refs)
    }

    /// Resolve into a graph, overriding the numeric-ref mode
    ///
    /// # Errors
    /// - Any [`ResolutionError`] from [`SankeyGraphBuilder::resolve`]
    pub fn resolve_with(self, numeric_refs: NumericRefs) -> Result<SankeyGraph, ResolutionError> {
        let mut builder = SankeyGraphBuilder::new().with_numeric_refs(numeric_refs);
        for node in self.nodes {
            builder.add_node(node);
        }
        for link in self.links {
            builder.add_link(link);
        }
        builder.resolve()
    }

    /// Parse and resolve in one step
    ///
    /// # Errors
    /// - `DocumentError::Parse` or `DocumentError::Resolution`
    pub fn parse_graph(json: &str) -> Result<SankeyGraph, DocumentError> {
        Ok(Self::from_json_str(json)?.resolve()?)
    }
}

fn finite(value: f64, field: impl FnOnce() -> String) -> Result<(), DocumentError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DocumentError::NonFinite { field: field(), value })
    }
}
