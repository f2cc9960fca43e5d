//! `pf-search` — stepwise shortest-path search and route reconstruction.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`engine`]   | `SearchEngine` state machine, `Touched`, `Outcome`            |
//! | [`frontier`] | `Frontier`, a min-heap with FIFO tie-break                   |
//! | [`path`]     | `reconstruct`, `Route`, `Hop`, `TraceCursor`, `PathTracer`    |
//! | [`error`]    | `SearchError`, `SearchResult<T>`                              |
//!
//! # Stepping model
//!
//! The engine never runs on its own.  A driver calls
//! [`SearchEngine::next_step`] and gets back the nodes whose tentative
//! distance improved during that one frontier pop.  Batch callers simply
//! call [`SearchEngine::run_to_completion`]; both paths execute the same
//! code, so an animated search and a batch search visit nodes in the same
//! order.
//!
//! All per-search state (distance, referer, parent, visited) lives in a
//! scratch table owned by the engine and indexed by `NodeId`.  The graph is
//! only read, so any number of engines can search one `Arc<Graph>`.

pub mod engine;
pub mod error;
pub mod frontier;
pub mod path;


pub use engine::{NodeScratch, Outcome, SearchEngine, SearchState, Touched};
pub use error::{SearchError, SearchResult};
pub use frontier::Frontier;
pub use path::{Hop, PathTracer, Route, TraceCursor, reconstruct};
