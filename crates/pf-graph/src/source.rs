//! Collaborator contracts: graph fetching and nearest-node resolution.
//!
//! The session never talks to a map service directly.  It is handed a
//! [`GraphSource`] and a [`NearestNodeResolver`], so an HTTP client, a local
//! OSM extract, or a test fixture can stand behind the same calls.

use std::sync::Arc;

use pf_core::{BoundingBox, GeoPoint, NodeKey};

use crate::{Graph, GraphError, GraphResult};

/// Identity and position of the node closest to a queried coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolvedNode {
    pub key: NodeKey,
    pub pos: GeoPoint,
}

/// Resolves a geographic coordinate to the closest known node.
///
/// There is no guarantee that the returned key is part of whatever graph
/// the caller currently has loaded.  Check with [`Graph::node`] and treat
/// absence as an out-of-bounds selection.
pub trait NearestNodeResolver {
    fn resolve_nearest(&self, point: GeoPoint) -> GraphResult<ResolvedNode>;
}

/// Supplies the road graph covering a bounding box.
///
/// `hint` is a node expected to lie inside `bbox` (the resolved start
/// point).  Failures must be returned, never replaced by an empty graph.
pub trait GraphSource {
    fn fetch_graph(&self, bbox: BoundingBox, hint: NodeKey) -> GraphResult<Graph>;
}

impl NearestNodeResolver for Graph {
    fn resolve_nearest(&self, point: GeoPoint) -> GraphResult<ResolvedNode> {
        let id = self.nearest(point).ok_or(GraphError::EmptyNetwork)?;
        Ok(ResolvedNode { key: self.key(id), pos: self.position(id) })
    }
}

/// Closures make ad-hoc sources (and failing ones in tests) cheap to write.
impl<F> GraphSource for F
where
    F: Fn(BoundingBox, NodeKey) -> GraphResult<Graph>,
{
    fn fetch_graph(&self, bbox: BoundingBox, hint: NodeKey) -> GraphResult<Graph> {
        self(bbox, hint)
    }
}

// ── InMemorySource ────────────────────────────────────────────────────────────

/// Serves fetches and nearest-node queries from one large preloaded graph,
/// e.g. a whole-city OSM extract.  Each fetch crops the area out of it.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    network: Arc<Graph>,
}

impl InMemorySource {
    pub fn new(network: Arc<Graph>) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &Arc<Graph> {
        &self.network
    }
}

impl GraphSource for InMemorySource {
    fn fetch_graph(&self, bbox: BoundingBox, hint: NodeKey) -> GraphResult<Graph> {
        self.network.crop(bbox, hint)
    }
}

impl NearestNodeResolver for InMemorySource {
    fn resolve_nearest(&self, point: GeoPoint) -> GraphResult<ResolvedNode> {
        self.network.resolve_nearest(point)
    }
}
