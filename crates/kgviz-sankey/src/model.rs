//! Sankey node and link types
//!
//! Links are built in two phases: first with raw endpoints ([`NodeRef`]),
//! then resolved into indices into the owning graph's node arena.

use crate::geometry::{HasExtent, Rect};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Raw link endpoint, before resolution
///
/// Deserializes untagged: JSON numbers become [`NodeRef::Index`], strings
/// become [`NodeRef::Id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    /// Position in the node sequence (or a numeric id, see [`NumericRefs`])
    Index(usize),
    /// Node identifier
    Id(String),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Id(id) => write!(f, "{id:?}"),
        }
    }
}

impl From<usize> for NodeRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for NodeRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for NodeRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// How numeric endpoints are interpreted during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericRefs {
    /// `NodeRef::Index(n)` is the n-th node
    #[default]
    Index,
    /// `NodeRef::Index(n)` is the node whose id is `n`
    Id,
}

/// Node as supplied to the builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique identifier; numbers in JSON are accepted and kept as text
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Display color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Pinned flow value, overriding the computed one
    #[serde(default, rename = "fixedValue", skip_serializing_if = "Option::is_none")]
    pub fixed_value: Option<f64>,

    /// Layer assigned by an external layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<usize>,

    /// Left edge from a prior layout
    #[serde(default)]
    pub x0: f64,
    /// Right edge from a prior layout
    #[serde(default)]
    pub x1: f64,
    /// Top edge from a prior layout
    #[serde(default)]
    pub y0: f64,
    /// Bottom edge from a prior layout
    #[serde(default)]
    pub y1: f64,
}

impl NodeSpec {
    /// Create a spec with the given id and no geometry
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            color: None,
            fixed_value: None,
            layer: None,
            x0: 0.0,
            x1: 0.0,
            y0: 0.0,
            y1: 0.0,
        }
    }

    /// With display label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// With pinned flow value
    #[inline]
    #[must_use]
    pub fn with_fixed_value(mut self, value: f64) -> Self {
        self.fixed_value = Some(value);
        self
    }

    /// With layout extent
    #[inline]
    #[must_use]
    pub fn with_extent(mut self, rect: Rect) -> Self {
        self.x0 = rect.x0;
        self.x1 = rect.x1;
        self.y0 = rect.y0;
        self.y1 = rect.y1;
        self
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Link with unresolved endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
    /// Source endpoint
    pub source: NodeRef,
    /// Target endpoint
    pub target: NodeRef,
    /// Flow value (finite, non-negative)
    pub value: f64,

    /// Stroke width from a prior layout
    #[serde(default)]
    pub width: f64,
    /// Vertical center at the source end
    #[serde(default)]
    pub y0: f64,
    /// Vertical center at the target end
    #[serde(default)]
    pub y1: f64,

    /// Display color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RawLink {
    /// Create a raw link
    #[must_use]
    pub fn new(source: impl Into<NodeRef>, target: impl Into<NodeRef>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
            width: 0.0,
            y0: 0.0,
            y1: 0.0,
            color: None,
        }
    }

    /// With link geometry
    #[inline]
    #[must_use]
    pub fn with_geometry(mut self, width: f64, y0: f64, y1: f64) -> Self {
        self.width = width;
        self.y0 = y0;
        self.y1 = y1;
        self
    }
}

/// Resolved node, owned by a [`SankeyGraph`](crate::SankeyGraph)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyNode {
    /// Identifier
    pub id: String,
    /// Display label
    pub label: Option<String>,
    /// Display color
    pub color: Option<String>,

    pub(crate) index: usize,
    /// Outgoing links (this node is their source)
    pub(crate) source_links: Vec<usize>,
    /// Incoming links (this node is their target)
    pub(crate) target_links: Vec<usize>,

    /// Left edge
    pub x0: f64,
    /// Right edge
    pub x1: f64,
    /// Top edge
    pub y0: f64,
    /// Bottom edge
    pub y1: f64,

    /// Longest path from a source node
    pub depth: usize,
    /// Longest path to a sink node
    pub height: usize,
    /// Layer assigned by the layout
    pub layer: Option<usize>,
    /// Flow through the node
    pub value: f64,
    /// Pinned flow value
    pub fixed_value: Option<f64>,
}

impl SankeyNode {
    pub(crate) fn from_spec(index: usize, spec: NodeSpec) -> Self {
        Self {
            id: spec.id,
            label: spec.label,
            color: spec.color,
            index,
            source_links: Vec::new(),
            target_links: Vec::new(),
            x0: spec.x0,
            x1: spec.x1,
            y0: spec.y0,
            y1: spec.y1,
            depth: 0,
            height: 0,
            layer: spec.layer,
            value: 0.0,
            fixed_value: spec.fixed_value,
        }
    }

    /// Position in the graph's node sequence
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Indices of outgoing links
    #[inline]
    #[must_use]
    pub fn source_links(&self) -> &[usize] {
        &self.source_links
    }

    /// Indices of incoming links
    #[inline]
    #[must_use]
    pub fn target_links(&self) -> &[usize] {
        &self.target_links
    }

    /// Display name: label if present, id otherwise
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

impl HasExtent for SankeyNode {
    fn extent(&self) -> Rect {
        Rect::new(self.x0, self.x1, self.y0, self.y1)
    }
}

/// Resolved link; endpoints index the owning graph's nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyLink {
    pub(crate) index: usize,
    pub(crate) source: usize,
    pub(crate) target: usize,

    /// Flow value
    pub value: f64,
    /// Stroke width
    pub width: f64,
    /// Vertical center at the source end
    pub y0: f64,
    /// Vertical center at the target end
    pub y1: f64,
    /// Display color
    pub color: Option<String>,
}

impl SankeyLink {
    /// Position in the graph's link sequence
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Source node index
    #[inline]
    #[must_use]
    pub fn source(&self) -> usize {
        self.source
    }

    /// Target node index
    #[inline]
    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Check if the link starts and ends at the same node
    #[inline]
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ref_deserializes_untagged() {
        let refs: Vec<NodeRef> = serde_json::from_str(r#"[3, "gene:BRCA1"]"#).unwrap();
        assert_eq!(refs, vec![NodeRef::Index(3), NodeRef::Id("gene:BRCA1".to_string())]);
    }

    #[test]
    fn node_spec_accepts_numeric_id() {
        let spec: NodeSpec = serde_json::from_str(r#"{"id": 42, "label": "TP53"}"#).unwrap();
        assert_eq!(spec.id, "42");
        assert_eq!(spec.label.as_deref(), Some("TP53"));
        assert_eq!(spec.x1, 0.0);
    }

    #[test]
    fn node_spec_reads_fixed_value() {
        let spec: NodeSpec = serde_json::from_str(r#"{"id": "a", "fixedValue": 2.5}"#).unwrap();
        assert_eq!(spec.fixed_value, Some(2.5));
    }

    #[test]
    fn node_name_falls_back_to_id() {
        let node = SankeyNode::from_spec(0, NodeSpec::new("n1"));
        assert_eq!(node.name(), "n1");
        let labelled = SankeyNode::from_spec(1, NodeSpec::new("n2").with_label("Glucose"));
        assert_eq!(labelled.name(), "Glucose");
    }

    #[test]
    fn node_ref_display() {
        assert_eq!(NodeRef::Index(2).to_string(), "#2");
        assert_eq!(NodeRef::from("x").to_string(), "\"x\"");
    }
}
