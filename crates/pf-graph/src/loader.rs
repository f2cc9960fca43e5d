//! CSV graph loader.
//!
//! # CSV format
//!
//! Two files.  Nodes, one row per node:
//!
//! ```csv
//! key,lat,lon
//! 1001,48.1371,11.5754
//! 1002,48.1380,11.5761
//! ```
//!
//! Edges, one row per road segment:
//!
//! ```csv
//! from,to,weight,oneway
//! 1001,1002,,false
//! 1002,1003,85.5,true
//! ```
//!
//! An empty `weight` derives the weight from the haversine distance between
//! the endpoints (times the weight scale).  An empty `oneway` means two-way.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use pf_core::{GeoPoint, NodeKey};

use crate::{EdgeSpec, Graph, GraphBuilder, GraphError, GraphResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    key: i64,
    lat: f32,
    lon: f32,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:   i64,
    to:     i64,
    weight: Option<f64>,
    oneway: Option<bool>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a graph from a node CSV file and an edge CSV file.
pub fn load_csv_files(nodes: &Path, edges: &Path, weight_scale: f64) -> GraphResult<Graph> {
    let nodes_file = std::fs::File::open(nodes)?;
    let edges_file = std::fs::File::open(edges)?;
    let graph = load_csv(nodes_file, edges_file, weight_scale)?;
    info!(
        nodes = %nodes.display(),
        edges = %edges.display(),
        node_count = graph.node_count(),
        edge_count = graph.edge_count(),
        "loaded graph from CSV"
    );
    Ok(graph)
}

/// Like [`load_csv_files`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or for bodies received
/// from a network service.
pub fn load_csv<N: Read, E: Read>(nodes: N, edges: E, weight_scale: f64) -> GraphResult<Graph> {
    let mut b = GraphBuilder::new().weight_scale(weight_scale);

    let mut node_reader = csv::Reader::from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let row = result.map_err(|e| GraphError::Parse(format!("nodes: {e}")))?;
        b.add_node(NodeKey(row.key), GeoPoint::new(row.lat, row.lon));
    }

    let mut edge_reader = csv::Reader::from_reader(edges);
    for result in edge_reader.deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| GraphError::Parse(format!("edges: {e}")))?;
        b.add_edge(EdgeSpec {
            from:   NodeKey(row.from),
            to:     NodeKey(row.to),
            weight: row.weight,
            oneway: row.oneway.unwrap_or(false),
        });
    }

    b.build()
}
