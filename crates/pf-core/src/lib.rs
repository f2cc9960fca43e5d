//! `pf-core` — foundational types for the `rust_pf` pathfinding workspace.
//!
//! This crate is a dependency of every other `pf-*` crate.  It has no `pf-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId` (dense indices), `NodeKey`         |
//! | [`geo`]         | `GeoPoint`, haversine distance, `BoundingBox`         |
//! | [`config`]      | `SearchConfig`                                        |
//! | [`error`]       | `PfError`, `PfResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SearchConfig;
pub use error::{PfError, PfResult};
pub use geo::{BoundingBox, GeoPoint};
pub use ids::{EdgeId, NodeId, NodeKey};
