use pf_core::NodeId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    /// The search finished without reaching its target.
    #[error("no path found from {origin} to {target}")]
    NoPathFound { origin: NodeId, target: NodeId },

    #[error("search has not finished yet")]
    NotFinished,

    #[error("node {0} is not part of the searched graph")]
    NodeNotInGraph(NodeId),
}

pub type SearchResult<T> = Result<T, SearchError>;
