//! `pf-graph` — road graph model, validation, spatial lookup, and sources.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `Graph` (CSR + R-tree), `GraphBuilder`, `load_graph`        |
//! | [`source`]  | `GraphSource`, `NearestNodeResolver`, `InMemorySource`      |
//! | [`loader`]  | `load_csv`, `load_csv_files`                                |
//! | [`osm`]     | `load_from_pbf` (feature = `"osm"` only)                    |
//! | [`error`]   | `GraphError`, `IntegrityViolation`, `GraphResult<T>`        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |

pub mod error;
pub mod graph;
pub mod loader;
pub mod source;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult, IntegrityViolation};
pub use graph::{Edge, EdgeSpec, Graph, GraphBuilder, Node, NodeSpec, load_graph};
pub use loader::{load_csv, load_csv_files};
pub use source::{GraphSource, InMemorySource, NearestNodeResolver, ResolvedNode};
