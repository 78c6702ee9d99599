//! Sankey Graph Builder
//!
//! The construction phase: collect nodes and raw links, then resolve them
//! into a [`SankeyGraph`] in a single pass over the links.

use crate::error::ResolutionError;
use crate::graph::SankeyGraph;
use crate::model::{NodeRef, NodeSpec, NumericRefs, RawLink, SankeyLink, SankeyNode};
use std::collections::HashMap;

/// Builder for resolved Sankey graphs
///
/// Usage:
/// ```rust
/// use kgviz_sankey::{NodeSpec, RawLink, SankeyGraphBuilder};
///
/// let mut builder = SankeyGraphBuilder::new();
/// builder.add_node(NodeSpec::new("glucose"));
/// builder.add_node(NodeSpec::new("pyruvate"));
/// builder.add_link(RawLink::new("glucose", "pyruvate", 2.0));
///
/// let graph = builder.resolve().unwrap();
/// assert_eq!(graph.link(0).unwrap().target(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SankeyGraphBuilder {
    nodes: Vec<NodeSpec>,
    links: Vec<RawLink>,
    numeric_refs: NumericRefs,
}

impl SankeyGraphBuilder {
    /// Create an empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how numeric endpoints are interpreted
    #[inline]
    #[must_use]
    pub fn with_numeric_refs(mut self, numeric_refs: NumericRefs) -> Self {
        self.numeric_refs = numeric_refs;
        self
    }

    /// Get the number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of links
    #[inline]
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Add a node
    ///
    /// Returns the index the node will have in the resolved graph.
    pub fn add_node(&mut self, spec: NodeSpec) -> usize {
        self.nodes.push(spec);
        self.nodes.len() - 1
    }

    /// Add a link with raw endpoints
    ///
    /// Endpoints are not checked until [`resolve`](Self::resolve).
    pub fn add_link(&mut self, link: RawLink) -> usize {
        self.links.push(link);
        self.links.len() - 1
    }

    /// Resolve every link endpoint and produce the graph
    ///
    /// # Errors
    /// - `ResolutionError::DuplicateNodeId` if two nodes share an id
    /// - `ResolutionError::UnknownNode` if an id endpoint matches no node
    /// - `ResolutionError::IndexOutOfRange` if an index endpoint is too large
    /// - `ResolutionError::InvalidLinkValue` if a value is negative or not finite
    pub fn resolve(self) -> Result<SankeyGraph, ResolutionError> {
        let node_count = self.nodes.len();

        let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(node_count);
        for (index, spec) in self.nodes.iter().enumerate() {
            if by_id.insert(spec.id.as_str(), index).is_some() {
                return Err(ResolutionError::DuplicateNodeId {
                    id: spec.id.clone(),
                });
            }
        }

        let lookup = |link: usize, reference: &NodeRef| -> Result<usize, ResolutionError> {
            match (reference, self.numeric_refs) {
                (NodeRef::Index(index), NumericRefs::Index) => {
                    if *index < node_count {
                        Ok(*index)
                    } else {
                        Err(ResolutionError::IndexOutOfRange {
                            link,
                            index: *index,
                            node_count,
                        })
                    }
                }
                (NodeRef::Index(index), NumericRefs::Id) => by_id
                    .get(index.to_string().as_str())
                    .copied()
                    .ok_or_else(|| ResolutionError::UnknownNode {
                        link,
                        reference: reference.clone(),
                    }),
                (NodeRef::Id(id), _) => {
                    by_id
                        .get(id.as_str())
                        .copied()
                        .ok_or_else(|| ResolutionError::UnknownNode {
                            link,
                            reference: reference.clone(),
                        })
                }
            }
        };

        let mut resolved = Vec::with_capacity(self.links.len());
        for (index, raw) in self.links.iter().enumerate() {
            if !raw.value.is_finite() || raw.value < 0.0 {
                return Err(ResolutionError::InvalidLinkValue {
                    link: index,
                    value: raw.value,
                });
            }
            let source = lookup(index, &raw.source)?;
            let target = lookup(index, &raw.target)?;
            resolved.push(SankeyLink {
                index,
                source,
                target,
                value: raw.value,
                width: raw.width,
                y0: raw.y0,
                y1: raw.y1,
                color: raw.color.clone(),
            });
        }
        drop(by_id);

        let mut nodes: Vec<SankeyNode> = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(index, spec)| SankeyNode::from_spec(index, spec))
            .collect();

        for link in &resolved {
            nodes[link.source].source_links.push(link.index);
            nodes[link.target].target_links.push(link.index);
        }

        tracing::debug!(
            nodes = nodes.len(),
            links = resolved.len(),
            "sankey graph resolved"
        );

        Ok(SankeyGraph::from_parts(nodes, resolved))
    }
}
