//! Graph-subsystem error type.

use thiserror::Error;

use pf_core::NodeKey;

/// A structural defect found while building a graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityViolation {
    #[error("edge {from} -> {to} references missing node {missing}")]
    DanglingEndpoint { from: NodeKey, to: NodeKey, missing: NodeKey },

    #[error("node {0} declared more than once")]
    DuplicateNode(NodeKey),

    #[error("edge {from} -> {to} has invalid weight {weight}")]
    InvalidWeight { from: NodeKey, to: NodeKey, weight: f64 },

    #[error("{0} nodes exceed the 32-bit node id space")]
    TooManyNodes(usize),
}

/// Errors produced by `pf-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed input graph.  Not recoverable without a new graph.
    #[error("graph integrity error: {0}")]
    Integrity(#[from] IntegrityViolation),

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeKey),

    #[error("hint node {0} lies outside the requested area")]
    HintOutsideArea(NodeKey),

    #[error("graph has no nodes")]
    EmptyNetwork,

    /// A graph source failed to deliver (network, upstream service, …).
    #[error("graph fetch failed: {0}")]
    Fetch(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
