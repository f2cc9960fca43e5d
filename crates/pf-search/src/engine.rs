//! Stepwise Dijkstra search engine.
//!
//! # State machine
//!
//! ```text
//!   Idle ──start()──▶ Running ──next_step()*──▶ Finished(PathFound | Unreachable)
//!    ▲                                                  │
//!    └──────────────────────── reset() ─────────────────┘
//! ```
//!
//! `start()` is also accepted from `Running` or `Finished`; it always begins
//! a fresh search.  `next_step()` outside `Running` is a no-op returning an
//! empty batch.
//!
//! # Scratch table
//!
//! One [`NodeScratch`] per graph node, indexed by `NodeId`:
//!
//! | Field      | Meaning                                                   |
//! |------------|-----------------------------------------------------------|
//! | `distance` | best known cost from the origin (`INFINITY` = unseen)     |
//! | `referer`  | node the best known cost was reached from                 |
//! | `parent`   | predecessor on the final route; set only on `PathFound`   |
//! | `visited`  | distance is final; the node will not be relaxed again     |
//!
//! `referer` changes every time a shorter way in is found.  `parent` is
//! written once, when the target is popped, by walking the referer chain
//! back to the origin.  Nodes off the final route never get a parent.

use std::sync::Arc;

use tracing::debug;

use pf_core::NodeId;
use pf_graph::Graph;

use crate::{Frontier, SearchError, SearchResult};

// ── Public types ──────────────────────────────────────────────────────────────

/// How a finished search ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The target was popped; parent links describe the shortest route.
    PathFound,
    /// The frontier ran dry before the target was reached.
    Unreachable,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Running,
    Finished(Outcome),
}

/// Per-node search bookkeeping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NodeScratch {
    pub distance: f64,
    pub referer:  NodeId,
    pub parent:   NodeId,
    pub visited:  bool,
}

impl NodeScratch {
    pub const UNSEEN: NodeScratch = NodeScratch {
        distance: f64::INFINITY,
        referer:  NodeId::INVALID,
        parent:   NodeId::INVALID,
        visited:  false,
    };

    #[inline]
    pub fn is_seen(&self) -> bool {
        self.distance.is_finite()
    }
}

impl Default for NodeScratch {
    fn default() -> Self {
        Self::UNSEEN
    }
}

/// A node whose tentative distance improved during one step.
///
/// `referer → node` is the edge a renderer should draw.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Touched {
    pub node:     NodeId,
    pub referer:  NodeId,
    pub distance: f64,
}

// ── SearchEngine ──────────────────────────────────────────────────────────────

/// Dijkstra's algorithm, advanced one frontier pop at a time.
///
/// Not thread-safe in the sense of concurrent calls on one instance; use one
/// engine per concurrent search.  Engines may share the same graph.
pub struct SearchEngine {
    graph:       Option<Arc<Graph>>,
    scratch:     Vec<NodeScratch>,
    frontier:    Frontier,
    /// Unvisited nodes with a finite distance.  Equals the number of distinct
    /// live nodes in `frontier`.
    open:        usize,
    state:       SearchState,
    origin:      NodeId,
    target:      NodeId,
    visit_order: Vec<NodeId>,
    /// Number of `start` calls so far; survives `reset`.
    generation:  u64,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self {
            graph:       None,
            scratch:     Vec::new(),
            frontier:    Frontier::new(),
            open:        0,
            state:       SearchState::Idle,
            origin:      NodeId::INVALID,
            target:      NodeId::INVALID,
            visit_order: Vec::new(),
            generation:  0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Begin a new search from `origin` to `target` over `graph`.
    ///
    /// Clears every node's scratch entry, seeds the frontier with the origin
    /// at distance zero, and moves to `Running`.
    pub fn start(&mut self, graph: Arc<Graph>, origin: NodeId, target: NodeId) -> SearchResult<()> {
        for id in [origin, target] {
            if !graph.has_id(id) {
                return Err(SearchError::NodeNotInGraph(id));
            }
        }

        self.clear_scratch(graph.node_count());
        self.origin = origin;
        self.target = target;

        self.scratch[origin.index()].distance = 0.0;
        self.frontier.push(origin, 0.0);
        self.open = 1;
        self.state = SearchState::Running;
        self.generation += 1;

        debug!(
            origin = %graph.key(origin),
            target = %graph.key(target),
            nodes = graph.node_count(),
            "search started"
        );
        self.graph = Some(graph);
        Ok(())
    }

    /// Return to `Idle`, discarding all search state.  The engine keeps its
    /// allocations for the next `start`.
    pub fn reset(&mut self) {
        self.graph = None;
        self.clear_scratch(0);
        self.origin = NodeId::INVALID;
        self.target = NodeId::INVALID;
        self.state = SearchState::Idle;
    }

    fn clear_scratch(&mut self, node_count: usize) {
        self.scratch.clear();
        self.scratch.resize(node_count, NodeScratch::UNSEEN);
        self.frontier.clear();
        self.open = 0;
        self.visit_order.clear();
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Perform one frontier pop.
    ///
    /// Returns every node whose distance and referer were updated by this
    /// pop, in edge order.  Returns an empty batch when the engine is not
    /// `Running`, when the popped node is the target, or when the popped
    /// node has no improvable neighbours.
    pub fn next_step(&mut self) -> Vec<Touched> {
        if self.state != SearchState::Running {
            return Vec::new();
        }
        let Some(graph) = self.graph.clone() else {
            return Vec::new();
        };

        // Skip stale heap entries.
        let node = loop {
            match self.frontier.pop() {
                None => {
                    self.finish(&graph, Outcome::Unreachable);
                    return Vec::new();
                }
                Some((n, _)) if self.scratch[n.index()].visited => continue,
                Some((n, _)) => break n,
            }
        };

        self.scratch[node.index()].visited = true;
        self.open -= 1;
        self.visit_order.push(node);

        if node == self.target {
            self.finalize_parents();
            self.finish(&graph, Outcome::PathFound);
            return Vec::new();
        }

        let base = self.scratch[node.index()].distance;
        let mut touched = Vec::with_capacity(graph.out_degree(node));

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_target(edge);
            let entry = &mut self.scratch[neighbor.index()];
            if entry.visited {
                continue;
            }

            let candidate = base + graph.edge_weight(edge);
            if candidate < entry.distance {
                if !entry.is_seen() {
                    self.open += 1;
                }
                entry.distance = candidate;
                entry.referer = node;
                self.frontier.push(neighbor, candidate);
                touched.push(Touched { node: neighbor, referer: node, distance: candidate });
            }
        }

        if self.open == 0 {
            self.finish(&graph, Outcome::Unreachable);
        }
        touched
    }

    /// Perform up to `max_pops` steps, concatenating their batches.  Stops
    /// early once the search finishes.
    pub fn step_batch(&mut self, max_pops: usize) -> Vec<Touched> {
        let mut all = Vec::new();
        for _ in 0..max_pops {
            if !self.is_running() {
                break;
            }
            all.extend(self.next_step());
        }
        all
    }

    /// Step until finished.  Returns `None` if no search was started.
    pub fn run_to_completion(&mut self) -> Option<Outcome> {
        while self.is_running() {
            self.next_step();
        }
        self.outcome()
    }

    /// Copy referers into parents along the chain target → origin.
    fn finalize_parents(&mut self) {
        let mut cur = self.target;
        // A referer chain can never be longer than the node count.
        for _ in 0..self.scratch.len() {
            let referer = self.scratch[cur.index()].referer;
            if !referer.is_valid() {
                break;
            }
            self.scratch[cur.index()].parent = referer;
            cur = referer;
        }
        debug_assert_eq!(cur, self.origin);
    }

    fn finish(&mut self, graph: &Graph, outcome: Outcome) {
        self.state = SearchState::Finished(outcome);
        debug!(
            origin = %graph.key(self.origin),
            target = %graph.key(self.target),
            ?outcome,
            expanded = self.visit_order.len(),
            "search finished"
        );
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> SearchState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == SearchState::Running
    }

    /// `true` once the search reached a terminal state.
    #[inline]
    pub fn finished(&self) -> bool {
        matches!(self.state, SearchState::Finished(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            SearchState::Finished(o) => Some(o),
            _ => None,
        }
    }

    /// Identifies the current search: bumped by every successful `start`,
    /// so observers can tell a restarted search from the one they tracked.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn graph(&self) -> Option<&Arc<Graph>> {
        self.graph.as_ref()
    }

    /// Origin of the current search, or `None` when idle.
    pub fn origin(&self) -> Option<NodeId> {
        self.origin.is_valid().then_some(self.origin)
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target.is_valid().then_some(self.target)
    }

    /// Full scratch entry for `id`, or `None` if `id` is outside the graph
    /// (or the engine is idle).
    pub fn scratch(&self, id: NodeId) -> Option<NodeScratch> {
        self.scratch.get(id.index()).copied()
    }

    /// Tentative (or final, once visited) distance; `None` if unseen.
    pub fn distance(&self, id: NodeId) -> Option<f64> {
        self.scratch(id).filter(NodeScratch::is_seen).map(|s| s.distance)
    }

    pub fn referer(&self, id: NodeId) -> Option<NodeId> {
        self.scratch(id)
            .map(|s| s.referer)
            .filter(|r| r.is_valid())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.scratch(id)
            .map(|s| s.parent)
            .filter(|p| p.is_valid())
    }

    pub fn is_visited(&self, id: NodeId) -> bool {
        self.scratch(id).is_some_and(|s| s.visited)
    }

    /// Number of nodes currently in the frontier (stale heap entries are
    /// not counted).
    pub fn frontier_len(&self) -> usize {
        self.open
    }

    /// Nodes in the order they were popped and finalized.
    pub fn visit_order(&self) -> &[NodeId] {
        &self.visit_order
    }

    pub fn expanded_count(&self) -> usize {
        self.visit_order.len()
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}
