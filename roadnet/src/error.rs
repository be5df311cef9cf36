use thiserror::Error;

use crate::graph::NodeId;

/// Errors returned by road network operations.
#[derive(Debug, Error)]
pub enum RoadNetError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("road graph has no nodes")]
    EmptyGraph,

    #[error("edge length must be non-negative, got {0}")]
    NegativeEdgeLength(f64),
}
