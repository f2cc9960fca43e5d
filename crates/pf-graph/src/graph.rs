//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays are sorted by source node (stable, so edges of one node
//! keep their insertion order) and indexed by `EdgeId`.  Iteration over a
//! node's outgoing edges is a contiguous memory scan.
//!
//! # Identity
//!
//! Every node carries its external [`NodeKey`] and a dense [`NodeId`].  The
//! key → id map is what answers "is this node part of the loaded area?".
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.

use std::ops::Range;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use pf_core::{BoundingBox, EdgeId, GeoPoint, NodeId, NodeKey};

use crate::{GraphError, GraphResult, IntegrityViolation};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Node / Edge views ─────────────────────────────────────────────────────────

/// Read-only view of one node.  Cheap to copy; borrows nothing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Node {
    pub id:  NodeId,
    pub key: NodeKey,
    pub pos: GeoPoint,
    out:     (u32, u32),
}

impl Node {
    /// Outgoing edges of this node.
    pub fn out_edges(&self) -> impl Iterator<Item = EdgeId> + use<> {
        (self.out.0..self.out.1).map(EdgeId)
    }

    pub fn out_degree(&self) -> usize {
        (self.out.1 - self.out.0) as usize
    }
}

/// Read-only view of one directed edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub id:     EdgeId,
    pub from:   NodeId,
    pub to:     NodeId,
    pub weight: f64,
    /// `true` if this edge was added as one direction of a two-way road.
    pub bidirectional: bool,
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a spatial index for node snapping.
///
/// Immutable once built.  Share it between sessions with `Arc<Graph>`; all
/// per-search state lives in the search engine, never here.
pub struct Graph {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    node_key: Vec<NodeKey>,
    node_pos: Vec<GeoPoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.  Length = `node_count + 1`.
    node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    edge_from:   Vec<NodeId>,
    edge_to:     Vec<NodeId>,
    edge_weight: Vec<f64>,
    edge_bidi:   Vec<bool>,

    key_index:   FxHashMap<NodeKey, NodeId>,
    spatial_idx: RTree<NodeEntry>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

impl Graph {
    /// A graph with no nodes or edges.
    pub fn empty() -> Self {
        Self {
            node_key:       Vec::new(),
            node_pos:       Vec::new(),
            node_out_start: vec![0],
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_weight:    Vec::new(),
            edge_bidi:      Vec::new(),
            key_index:      FxHashMap::default(),
            spatial_idx:    RTree::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Dense id of the node with external key `key`, if it is loaded.
    #[inline]
    pub fn node_id(&self, key: NodeKey) -> Option<NodeId> {
        self.key_index.get(&key).copied()
    }

    /// Node with external key `key`.  Absence is not an error: it is how
    /// callers learn that a point lies outside the loaded area.
    pub fn node(&self, key: NodeKey) -> Option<Node> {
        self.node_id(key).map(|id| self.node_at(id))
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.key_index.contains_key(&key)
    }

    /// `true` if `id` is a valid dense index for this graph.
    #[inline]
    pub fn has_id(&self, id: NodeId) -> bool {
        id.index() < self.node_count()
    }

    /// Node view by dense id.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this graph.
    pub fn node_at(&self, id: NodeId) -> Node {
        let i = id.index();
        Node {
            id,
            key: self.node_key[i],
            pos: self.node_pos[i],
            out: (self.node_out_start[i], self.node_out_start[i + 1]),
        }
    }

    #[inline]
    pub fn key(&self, id: NodeId) -> NodeKey {
        self.node_key[id.index()]
    }

    #[inline]
    pub fn position(&self, id: NodeId) -> GeoPoint {
        self.node_pos[id.index()]
    }

    /// Iterator over all nodes in `NodeId` order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        (0..self.node_count() as u32).map(|i| self.node_at(NodeId(i)))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// A contiguous index range; no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + use<> {
        self.out_range(node).map(EdgeId)
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_range(node).len()
    }

    #[inline]
    fn out_range(&self, node: NodeId) -> Range<u32> {
        self.node_out_start[node.index()]..self.node_out_start[node.index() + 1]
    }

    pub fn edge(&self, id: EdgeId) -> Edge {
        let i = id.index();
        Edge {
            id,
            from:          self.edge_from[i],
            to:            self.edge_to[i],
            weight:        self.edge_weight[i],
            bidirectional: self.edge_bidi[i],
        }
    }

    #[inline]
    pub fn edge_target(&self, id: EdgeId) -> NodeId {
        self.edge_to[id.index()]
    }

    #[inline]
    pub fn edge_weight(&self, id: EdgeId) -> f64 {
        self.edge_weight[id.index()]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest node to `pos`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }

    // ── Sub-graphs ────────────────────────────────────────────────────────

    /// Sub-graph of all nodes inside `bbox` and the edges between them.
    ///
    /// `hint` must be a node of this graph that lies inside `bbox`; it is
    /// the node the caller intends to start searching from.
    pub fn crop(&self, bbox: BoundingBox, hint: NodeKey) -> GraphResult<Graph> {
        let hint_id = self.node_id(hint).ok_or(GraphError::NodeNotFound(hint))?;
        if !bbox.contains(self.position(hint_id)) {
            return Err(GraphError::HintOutsideArea(hint));
        }

        let mut b = GraphBuilder::new();
        let inside: Vec<bool> = self.node_pos.iter().map(|&p| bbox.contains(p)).collect();

        for node in self.nodes().filter(|n| inside[n.id.index()]) {
            b.add_node(node.key, node.pos);
        }
        for i in 0..self.edge_count() {
            let (from, to) = (self.edge_from[i], self.edge_to[i]);
            if inside[from.index()] && inside[to.index()] {
                b.push_edge(
                    self.key(from),
                    self.key(to),
                    self.edge_weight[i],
                    self.edge_bidi[i],
                );
            }
        }

        let cropped = b.build()?;
        info!(
            %bbox,
            %hint,
            nodes = cropped.node_count(),
            edges = cropped.edge_count(),
            "cropped graph to selection area"
        );
        Ok(cropped)
    }
}

// ── Plain-data input records ──────────────────────────────────────────────────

/// Node record accepted by [`load_graph`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NodeSpec {
    pub key: NodeKey,
    pub pos: GeoPoint,
}

/// Edge record accepted by [`load_graph`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeSpec {
    pub from: NodeKey,
    pub to:   NodeKey,
    /// Explicit weight, or `None` to derive it from the endpoints' distance.
    pub weight: Option<f64>,
    /// One-way edges add a single directed edge; otherwise both directions.
    pub oneway: bool,
}

/// Build a graph from plain node and edge records.
///
/// Fails with [`GraphError::Integrity`] if an edge references a node that is
/// not in `nodes`, a key repeats, or a weight is negative or not finite.
pub fn load_graph<N, E>(nodes: N, edges: E) -> GraphResult<Graph>
where
    N: IntoIterator<Item = NodeSpec>,
    E: IntoIterator<Item = EdgeSpec>,
{
    let mut b = GraphBuilder::new();
    for n in nodes {
        b.add_node(n.key, n.pos);
    }
    for e in edges {
        b.add_edge(e);
    }
    b.build()
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`Graph`] incrementally, then call [`build`](Self::build).
///
/// Nodes and edges may be added in any order; edges refer to nodes by
/// external key.  All integrity checks happen in `build()`, which reports the
/// first violation found.
///
/// # Example
///
/// ```
/// use pf_core::{GeoPoint, NodeKey};
/// use pf_graph::GraphBuilder;
///
/// let mut b = GraphBuilder::new();
/// b.add_node(NodeKey(1), GeoPoint::new(48.13, 11.57));
/// b.add_node(NodeKey(2), GeoPoint::new(48.14, 11.57));
/// b.add_road(NodeKey(1), NodeKey(2), 1_100.0);
/// let g = b.build().unwrap();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 2); // bidirectional
/// ```
pub struct GraphBuilder {
    nodes:        Vec<(NodeKey, GeoPoint)>,
    raw_edges:    Vec<RawEdge>,
    weight_scale: f64,
}

struct RawEdge {
    from:   NodeKey,
    to:     NodeKey,
    /// `None` = derive from distance at build time.
    weight: Option<f64>,
    bidi:   bool,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new(), weight_scale: 1.0 }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:        Vec::with_capacity(nodes),
            raw_edges:    Vec::with_capacity(edges),
            weight_scale: 1.0,
        }
    }

    /// Multiplier applied to distance-derived weights.  Explicit weights are
    /// used as given.
    pub fn weight_scale(mut self, scale: f64) -> Self {
        self.weight_scale = scale;
        self
    }

    /// Add a node.  Returns the `NodeId` it will have in the built graph.
    pub fn add_node(&mut self, key: NodeKey, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push((key, pos));
        id
    }

    /// Add a **directed** edge with an explicit weight.
    pub fn add_directed_edge(&mut self, from: NodeKey, to: NodeKey, weight: f64) {
        self.push_edge(from, to, weight, false);
    }

    /// Add edges in **both directions** for a two-way road segment.
    pub fn add_road(&mut self, a: NodeKey, b: NodeKey, weight: f64) {
        self.push_edge(a, b, weight, true);
        self.push_edge(b, a, weight, true);
    }

    /// Add a road whose weight is the haversine distance between its
    /// endpoints (metres) times the builder's weight scale.
    pub fn add_road_by_distance(&mut self, a: NodeKey, b: NodeKey, oneway: bool) {
        self.add_edge(EdgeSpec { from: a, to: b, weight: None, oneway });
    }

    /// Add an edge from a plain record.
    pub fn add_edge(&mut self, e: EdgeSpec) {
        let bidi = !e.oneway;
        self.raw_edges.push(RawEdge { from: e.from, to: e.to, weight: e.weight, bidi });
        if bidi {
            self.raw_edges.push(RawEdge { from: e.to, to: e.from, weight: e.weight, bidi });
        }
    }

    fn push_edge(&mut self, from: NodeKey, to: NodeKey, weight: f64, bidi: bool) {
        self.raw_edges.push(RawEdge { from, to, weight: Some(weight), bidi });
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Validate and produce a [`Graph`].
    ///
    /// Time complexity: O(E log E) for the edge sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> GraphResult<Graph> {
        let node_count = self.nodes.len();
        if NodeId::from_index(node_count).is_none() {
            return Err(IntegrityViolation::TooManyNodes(node_count).into());
        }

        let mut key_index: FxHashMap<NodeKey, NodeId> = FxHashMap::default();
        key_index.reserve(node_count);
        for (i, &(key, _)) in self.nodes.iter().enumerate() {
            if key_index.insert(key, NodeId(i as u32)).is_some() {
                return Err(IntegrityViolation::DuplicateNode(key).into());
            }
        }

        // Resolve keys and weights; the first dangling endpoint aborts.
        let mut resolved: Vec<(NodeId, NodeId, f64, bool)> = Vec::with_capacity(self.raw_edges.len());
        for e in &self.raw_edges {
            let lookup = |k: NodeKey| {
                key_index.get(&k).copied().ok_or(IntegrityViolation::DanglingEndpoint {
                    from:    e.from,
                    to:      e.to,
                    missing: k,
                })
            };
            let from = lookup(e.from)?;
            let to = lookup(e.to)?;
            let weight = match e.weight {
                Some(w) => w,
                None => {
                    let len_m = self.nodes[from.index()].1.distance_m(self.nodes[to.index()].1);
                    len_m as f64 * self.weight_scale
                }
            };
            if !weight.is_finite() || weight < 0.0 {
                return Err(IntegrityViolation::InvalidWeight { from: e.from, to: e.to, weight }.into());
            }
            resolved.push((from, to, weight, e.bidi));
        }

        // Stable sort keeps each node's edges in insertion order.
        resolved.sort_by_key(|&(from, ..)| from.0);

        let edge_from:   Vec<NodeId> = resolved.iter().map(|e| e.0).collect();
        let edge_to:     Vec<NodeId> = resolved.iter().map(|e| e.1).collect();
        let edge_weight: Vec<f64>    = resolved.iter().map(|e| e.2).collect();
        let edge_bidi:   Vec<bool>   = resolved.iter().map(|e| e.3).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for from in &edge_from {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_to.len());

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &(_, pos))| NodeEntry { point: [pos.lat, pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let (node_key, node_pos) = self.nodes.into_iter().unzip();

        debug!(nodes = node_count, edges = edge_to.len(), "built graph");

        Ok(Graph {
            node_key,
            node_pos,
            node_out_start,
            edge_from,
            edge_to,
            edge_weight,
            edge_bidi,
            key_index,
            spatial_idx,
        })
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
