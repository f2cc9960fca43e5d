use pf_core::{GeoPoint, NodeKey, PfError};
use pf_graph::GraphError;
use pf_search::SearchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// A selection fell outside the loaded area.  Recoverable: prompt for a
    /// selection inside it.
    #[error("{0}")]
    OutOfBounds(Outside),

    /// An operation was called out of order (e.g. `start` before both
    /// endpoints are chosen).
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    #[error("session configuration error: {0}")]
    Config(#[from] PfError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// What fell outside the loaded area.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Outside {
    /// A node key that the loaded graph does not contain.
    #[error("node {0} is outside the loaded graph")]
    Node(NodeKey),

    /// A clicked point outside the fetched selection area.
    #[error("point {0} is outside the selection area")]
    Point(GeoPoint),
}

pub type SessionResult<T> = Result<T, SessionError>;
