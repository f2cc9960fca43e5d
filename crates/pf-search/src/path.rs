//! Route reconstruction from a finished search.
//!
//! Two ways to consume the result:
//!
//! - [`reconstruct`] returns the whole [`Route`] in origin → target order.
//! - [`TraceCursor`] / [`PathTracer`] walk the parent links one hop per call,
//!   starting at the target, which is how an animation draws the route
//!   growing back towards the start.

use pf_core::{NodeId, NodeKey};
use pf_graph::Graph;

use crate::{Outcome, SearchEngine, SearchError, SearchResult, SearchState};

/// One edge of the final route, `from` being the predecessor of `to`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Hop {
    pub from: NodeId,
    pub to:   NodeId,
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// Shortest route found by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes to traverse in order, origin first and target last.
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along `nodes`.
    pub total_cost: f64,
}

impl Route {
    /// `true` if origin and target are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Hops in origin → target order.
    pub fn hops(&self) -> impl Iterator<Item = Hop> + '_ {
        self.nodes.windows(2).map(|w| Hop { from: w[0], to: w[1] })
    }

    /// External keys of the route's nodes.
    pub fn keys(&self, graph: &Graph) -> Vec<NodeKey> {
        self.nodes.iter().map(|&n| graph.key(n)).collect()
    }
}

/// Build the route of a finished search.
///
/// # Errors
///
/// - [`SearchError::NotFinished`] if the engine is idle or still running.
/// - [`SearchError::NoPathFound`] if the search ended `Unreachable`.
pub fn reconstruct(engine: &SearchEngine) -> SearchResult<Route> {
    let cursor = TraceCursor::new(engine)?;
    let target = cursor.position();

    let mut nodes = vec![target];
    nodes.extend(PathTracer { engine, cursor }.map(|hop| hop.from));
    nodes.reverse();

    Ok(Route {
        nodes,
        total_cost: engine.distance(target).unwrap_or(0.0),
    })
}

// ── Incremental tracing ───────────────────────────────────────────────────────

/// Position in a backward walk over parent links.
///
/// Holds no borrow, so a driver can keep it between ticks while the engine
/// stays reachable through `&mut` elsewhere.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TraceCursor {
    current: NodeId,
    done:    bool,
}

impl TraceCursor {
    /// Cursor positioned at the target of a successful search.
    pub fn new(engine: &SearchEngine) -> SearchResult<Self> {
        match engine.state() {
            SearchState::Finished(Outcome::PathFound) => {}
            SearchState::Finished(Outcome::Unreachable) => {
                return Err(SearchError::NoPathFound {
                    origin: engine.origin().unwrap_or_default(),
                    target: engine.target().unwrap_or_default(),
                });
            }
            _ => return Err(SearchError::NotFinished),
        }
        let target = engine.target().ok_or(SearchError::NotFinished)?;
        Ok(Self { current: target, done: false })
    }

    /// Node the cursor currently sits on.
    pub fn position(&self) -> NodeId {
        self.current
    }

    /// `true` once the origin has been reached.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Step to the parent of the current node.
    ///
    /// Returns `None` once the cursor sits on the origin; further calls keep
    /// returning `None`.
    pub fn advance(&mut self, engine: &SearchEngine) -> Option<Hop> {
        if self.done {
            return None;
        }
        match engine.parent(self.current) {
            Some(parent) => {
                let hop = Hop { from: parent, to: self.current };
                self.current = parent;
                Some(hop)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Iterator over the route's hops from the target back to the origin.
pub struct PathTracer<'e> {
    engine: &'e SearchEngine,
    cursor: TraceCursor,
}

impl<'e> PathTracer<'e> {
    pub fn new(engine: &'e SearchEngine) -> SearchResult<Self> {
        Ok(Self { engine, cursor: TraceCursor::new(engine)? })
    }

    /// Produce one hop; `None` once the origin is reached.
    pub fn next_hop(&mut self) -> Option<Hop> {
        self.cursor.advance(self.engine)
    }

    pub fn is_done(&self) -> bool {
        self.cursor.is_done()
    }

    pub fn cursor(&self) -> TraceCursor {
        self.cursor
    }
}

impl Iterator for PathTracer<'_> {
    type Item = Hop;

    fn next(&mut self) -> Option<Hop> {
        self.next_hop()
    }
}
