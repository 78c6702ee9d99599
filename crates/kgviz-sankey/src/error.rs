//! Error types for Sankey graph construction

use crate::model::NodeRef;

/// Graph resolution errors
///
/// All of these are reported at construction time; a graph is never
/// produced with a dangling endpoint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    /// Endpoint id matches no node
    #[error("link {link}: unknown node {reference}")]
    UnknownNode {
        /// Offending link index
        link: usize,
        /// Unmatched endpoint
        reference: NodeRef,
    },

    /// Endpoint index past the end of the node sequence
    #[error("link {link}: node index {index} out of range ({node_count} nodes)")]
    IndexOutOfRange {
        /// Offending link index
        link: usize,
        /// Requested index
        index: usize,
        /// Number of nodes in the graph
        node_count: usize,
    },

    /// Two nodes share an id
    #[error("duplicate node id {id:?}")]
    DuplicateNodeId {
        /// Repeated id
        id: String,
    },

    /// Link value is negative or not finite
    #[error("link {link}: invalid value {value}")]
    InvalidLinkValue {
        /// Offending link index
        link: usize,
        /// Rejected value
        value: f64,
    },

    /// The links contain a cycle, so depths are undefined
    #[error("circular link through node {id:?}")]
    CircularLink {
        /// A node on the cycle
        id: String,
    },
}

impl ResolutionError {
    /// Index of the offending link, for link-level errors
    #[inline]
    #[must_use]
    pub fn link(&self) -> Option<usize> {
        match self {
            Self::UnknownNode { link, .. }
            | Self::IndexOutOfRange { link, .. }
            | Self::InvalidLinkValue { link, .. } => Some(*link),
            Self::DuplicateNodeId { .. } | Self::CircularLink { .. } => None,
        }
    }
}

/// Errors loading a [`SankeyDocument`](crate::SankeyDocument)
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// JSON could not be parsed
    #[error("invalid sankey document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parsed, but links could not be resolved
    #[error("sankey resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// A number has no JSON representation
    #[error("{field} is {value}, which JSON cannot represent")]
    NonFinite {
        /// Path of the offending field, e.g. `nodes[2].x1`
        field: String,
        /// The offending value
        value: f64,
    },
}
