//! Resolved Sankey graph
//!
//! A [`SankeyGraph`] can only be produced by resolution
//! ([`SankeyGraphBuilder::resolve`](crate::SankeyGraphBuilder::resolve)), so
//! every link endpoint indexes a node of the same graph. Nodes and links live
//! in two arenas and refer to each other by index.

use crate::error::ResolutionError;
use crate::geometry::{bounding_rect, HasExtent, Rect};
use crate::model::{SankeyLink, SankeyNode};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

/// Resolved Sankey graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyGraph {
    nodes: Vec<SankeyNode>,
    links: Vec<SankeyLink>,
}

impl SankeyGraph {
    /// Assemble a graph from already-resolved parts (construction phase only)
    pub(crate) fn from_parts(nodes: Vec<SankeyNode>, links: Vec<SankeyLink>) -> Self {
        Self { nodes, links }
    }

    /// Nodes in order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[SankeyNode] {
        &self.nodes
    }

    /// Links in order
    #[inline]
    #[must_use]
    pub fn links(&self) -> &[SankeyLink] {
        &self.links
    }

    /// Node by index
    #[inline]
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&SankeyNode> {
        self.nodes.get(index)
    }

    /// Node by id
    #[must_use]
    pub fn node_by_id(&self, id: &str) -> Option<&SankeyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Link by index
    #[inline]
    #[must_use]
    pub fn link(&self, index: usize) -> Option<&SankeyLink> {
        self.links.get(index)
    }

    /// Mutable nodes, for the layout step
    ///
    /// Adjacency and indices stay private, so the resolution invariant
    /// cannot be broken through this.
    #[inline]
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SankeyNode> {
        self.nodes.iter_mut()
    }

    /// Mutable links, for the layout step
    #[inline]
    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut SankeyLink> {
        self.links.iter_mut()
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

    /// Check if the graph has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Source and target nodes of a link
    #[must_use]
    pub fn endpoints(&self, link: &SankeyLink) -> (&SankeyNode, &SankeyNode) {
        (&self.nodes[link.source], &self.nodes[link.target])
    }

    /// Outgoing links of a node
    pub fn outgoing<'a>(&'a self, node: &'a SankeyNode) -> impl Iterator<Item = &'a SankeyLink> + 'a {
        node.source_links.iter().map(move |&index| &self.links[index])
    }

    /// Incoming links of a node
    pub fn incoming<'a>(&'a self, node: &'a SankeyNode) -> impl Iterator<Item = &'a SankeyLink> + 'a {
        node.target_links.iter().map(move |&index| &self.links[index])
    }

    /// Set each node's value to the larger of its in- and out-flow
    ///
    /// A pinned `fixed_value` takes precedence.
    pub fn compute_node_values(&mut self) {
        for node in &mut self.nodes {
            node.value = match node.fixed_value {
                Some(fixed) => fixed,
                None => {
                    let outflow: f64 = node.source_links.iter().map(|&i| self.links[i].value).sum();
                    let inflow: f64 = node.target_links.iter().map(|&i| self.links[i].value).sum();
                    outflow.max(inflow)
                }
            };
        }
    }

    /// Node indices in topological order
    fn topological_order(&self) -> Result<Vec<usize>, ResolutionError> {
        let mut flow: DiGraph<usize, ()> = DiGraph::with_capacity(self.nodes.len(), self.links.len());
        let indices: Vec<NodeIndex> = (0..self.nodes.len()).map(|i| flow.add_node(i)).collect();
        for link in &self.links {
            flow.add_edge(indices[link.source], indices[link.target], ());
        }

        let order = toposort(&flow, None).map_err(|cycle| ResolutionError::CircularLink {
            id: self.nodes[flow[cycle.node_id()]].id.clone(),
        })?;
        Ok(order.into_iter().map(|position| flow[position]).collect())
    }

    /// Set each node's `depth` to its longest path from a source node
    ///
    /// # Errors
    /// - `ResolutionError::CircularLink` if the links form a cycle
    pub fn compute_depths(&mut self) -> Result<(), ResolutionError> {
        let order = self.topological_order()?;
        for node in &mut self.nodes {
            node.depth = 0;
        }

        for index in order {
            let depth = self.nodes[index].depth;
            for &link in &self.nodes[index].source_links.clone() {
                let target = self.links[link].target;
                self.nodes[target].depth = self.nodes[target].depth.max(depth + 1);
            }
        }

        tracing::debug!(
            max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
            "sankey depths computed"
        );
        Ok(())
    }

    /// Set each node's `height` to its longest path to a sink node
    ///
    /// # Errors
    /// - `ResolutionError::CircularLink` if the links form a cycle
    pub fn compute_heights(&mut self) -> Result<(), ResolutionError> {
        let order = self.topological_order()?;
        for node in &mut self.nodes {
            node.height = 0;
        }

        for index in order.into_iter().rev() {
            let height = self.nodes[index].height;
            for &link in &self.nodes[index].target_links.clone() {
                let source = self.links[link].source;
                self.nodes[source].height = self.nodes[source].height.max(height + 1);
            }
        }
        Ok(())
    }

    /// Run the pre-layout computations: node values, depths and heights
    ///
    /// # Errors
    /// - `ResolutionError::CircularLink` if the links form a cycle
    pub fn prepare(&mut self) -> Result<(), ResolutionError> {
        self.compute_node_values();
        self.compute_depths()?;
        self.compute_heights()
    }

    /// Extent of a laid-out link
    ///
    /// Spans from the source node's right edge to the target node's left
    /// edge, and vertically covers both ends including stroke width.
    #[must_use]
    pub fn link_rect(&self, link: &SankeyLink) -> Rect {
        let (source, target) = self.endpoints(link);
        Rect::from_points((source.x1, link.y0), (target.x0, link.y1)).padded_y(link.width / 2.0)
    }

    /// Extents of every node
    pub fn node_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.nodes.iter().map(HasExtent::extent)
    }

    /// Extents of every link
    pub fn link_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.links.iter().map(|link| self.link_rect(link))
    }

    /// Rect enclosing every node and link
    ///
    /// Empty graphs return [`Rect::EMPTY`].
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        bounding_rect(self.node_rects().chain(self.link_rects()))
    }

    /// Topmost node containing the point
    ///
    /// Later nodes are drawn over earlier ones, so the last match wins.
    #[must_use]
    pub fn node_at(&self, x: f64, y: f64) -> Option<&SankeyNode> {
        self.nodes.iter().rev().find(|node| node.extent().contains(x, y))
    }

    /// Nodes overlapping the rect, in graph order
    pub fn nodes_in<'a>(&'a self, area: &'a Rect) -> impl Iterator<Item = &'a SankeyNode> + 'a {
        self.nodes.iter().filter(move |node| node.extent().intersects(area))
    }
}
