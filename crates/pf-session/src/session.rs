//! Session lifecycle: graph, endpoint selection, and the search it drives.

use std::sync::Arc;

use tracing::{debug, info, warn};

use pf_core::{BoundingBox, GeoPoint, NodeKey, SearchConfig};
use pf_graph::{Graph, GraphSource, NearestNodeResolver, ResolvedNode};
use pf_search::{Outcome, PathTracer, Route, SearchEngine, SearchState, Touched, reconstruct};

use crate::{Outside, SessionError, SessionResult};

/// Binds a loaded graph, the chosen start/end nodes, and one search engine.
///
/// Selections are stored by [`NodeKey`], so they survive a graph swap as
/// long as the node is part of the new graph.
///
/// # Reset semantics
///
/// | Call               | Graph | Start | End               | Search  |
/// |--------------------|-------|-------|-------------------|---------|
/// | `set_graph`        | new   | kept  | kept if contained | cleared |
/// | `set_start_node`   | kept  | new   | cleared           | cleared |
/// | `set_end_node`     | kept  | kept  | new               | cleared |
/// | `reset`            | kept  | kept  | kept              | cleared |
/// | `clear_selection`  | kept  | none  | none              | cleared |
///
/// `select_start` also records the selection area it fetched; `set_graph`
/// forgets it, since a graph installed directly has no known area.
pub struct Session {
    config: SearchConfig,
    graph:  Option<Arc<Graph>>,
    area:   Option<BoundingBox>,
    start:  Option<NodeKey>,
    end:    Option<NodeKey>,
    engine: SearchEngine,
}

impl Session {
    /// Create an empty session.  Fails if `config` does not validate.
    pub fn new(config: SearchConfig) -> SessionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            graph:  None,
            area:   None,
            start:  None,
            end:    None,
            engine: SearchEngine::new(),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn graph(&self) -> Option<&Arc<Graph>> {
        self.graph.as_ref()
    }

    /// Area fetched by the last `select_start`, if the graph came from one.
    pub fn selection_area(&self) -> Option<BoundingBox> {
        self.area
    }

    pub fn start_node(&self) -> Option<NodeKey> {
        self.start
    }

    pub fn end_node(&self) -> Option<NodeKey> {
        self.end
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn state(&self) -> SearchState {
        self.engine.state()
    }

    /// `true` once the current search reached a terminal state.
    pub fn finished(&self) -> bool {
        self.engine.finished()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.engine.outcome()
    }

    /// `true` when graph, start and end are all present.
    pub fn can_start(&self) -> bool {
        self.graph.is_some() && self.start.is_some() && self.end.is_some()
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Replace the loaded graph.  The search is reset and an end node the new
    /// graph does not contain is dropped.
    pub fn set_graph(&mut self, graph: Arc<Graph>) {
        if let Some(end) = self.end.filter(|&k| !graph.contains(k)) {
            debug!(%end, "end node not in new graph; clearing it");
            self.end = None;
        }
        info!(nodes = graph.node_count(), edges = graph.edge_count(), "graph loaded");
        self.graph = Some(graph);
        self.area = None;
        self.engine.reset();
    }

    /// Choose a new start node.  Clears the end node and the search, the way
    /// picking a new start point begins a new selection round.
    ///
    /// The graph may not be loaded yet; membership is checked by `start`.
    pub fn set_start_node(&mut self, key: NodeKey) {
        self.start = Some(key);
        self.end = None;
        self.engine.reset();
    }

    /// Choose the end node.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`] if no graph is loaded.
    /// - [`SessionError::OutOfBounds`] if `key` is not in the loaded graph.
    ///
    /// Selections are untouched on error.
    pub fn set_end_node(&mut self, key: NodeKey) -> SessionResult<()> {
        let graph = self.graph.as_ref().ok_or(SessionError::InvalidState("no graph loaded"))?;
        if !graph.contains(key) {
            warn!(%key, "end node is outside the loaded graph");
            return Err(SessionError::OutOfBounds(Outside::Node(key)));
        }
        self.end = Some(key);
        self.engine.reset();
        Ok(())
    }

    /// Forget both endpoints and the search; keep the graph.
    pub fn clear_selection(&mut self) {
        self.start = None;
        self.end = None;
        self.engine.reset();
    }

    /// Resolve `point` to its nearest node, make it the start, and fetch the
    /// surrounding area (radius `config.selection_radius_km`) from `source`.
    ///
    /// All-or-nothing: if resolution or the fetch fails, the session is left
    /// exactly as it was.
    pub fn select_start<R, S>(
        &mut self,
        resolver: &R,
        source:   &S,
        point:    GeoPoint,
    ) -> SessionResult<ResolvedNode>
    where
        R: NearestNodeResolver + ?Sized,
        S: GraphSource + ?Sized,
    {
        let resolved = resolver.resolve_nearest(point)?;
        let bbox = BoundingBox::around(resolved.pos, self.config.selection_radius_km);
        let graph = source.fetch_graph(bbox, resolved.key)?;

        self.set_start_node(resolved.key);
        self.set_graph(Arc::new(graph));
        self.area = Some(bbox);
        Ok(resolved)
    }

    /// Resolve `point` to its nearest node and make it the end.
    ///
    /// Returns [`SessionError::OutOfBounds`] if `point` lies outside the
    /// selection area, or if the resolved node is not in the loaded graph.
    /// A click outside the area is rejected even when its nearest node is
    /// inside.
    pub fn select_end<R>(&mut self, resolver: &R, point: GeoPoint) -> SessionResult<ResolvedNode>
    where
        R: NearestNodeResolver + ?Sized,
    {
        if self.graph.is_none() {
            return Err(SessionError::InvalidState("no graph loaded"));
        }
        if let Some(area) = self.area.filter(|a| !a.contains(point)) {
            warn!(%point, %area, "end point is outside the selection area");
            return Err(SessionError::OutOfBounds(Outside::Point(point)));
        }
        let resolved = resolver.resolve_nearest(point)?;
        self.set_end_node(resolved.key)?;
        Ok(resolved)
    }

    // ── Search ────────────────────────────────────────────────────────────

    /// Begin searching from the start node to the end node.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidState`] unless a graph is loaded, both
    /// endpoints are chosen, and both lie inside the graph.
    pub fn start(&mut self) -> SessionResult<()> {
        let graph = self.graph.as_ref().ok_or(SessionError::InvalidState("no graph loaded"))?;
        let start = self.start.ok_or(SessionError::InvalidState("no start node selected"))?;
        let end = self.end.ok_or(SessionError::InvalidState("no end node selected"))?;

        let origin = graph
            .node_id(start)
            .ok_or(SessionError::InvalidState("start node is not in the loaded graph"))?;
        let target = graph
            .node_id(end)
            .ok_or(SessionError::InvalidState("end node is not in the loaded graph"))?;

        self.engine.start(Arc::clone(graph), origin, target)?;
        Ok(())
    }

    /// One frontier pop.  Empty when idle or finished.
    pub fn next_step(&mut self) -> Vec<Touched> {
        self.engine.next_step()
    }

    /// `config.steps_per_tick` frontier pops.
    pub fn step_tick(&mut self) -> Vec<Touched> {
        self.engine.step_batch(self.config.steps_per_tick)
    }

    /// Clear search state and `finished`; graph and selections stay.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Route of the finished search, origin first.
    pub fn route(&self) -> SessionResult<Route> {
        Ok(reconstruct(&self.engine)?)
    }

    /// Hop-by-hop walk from the end node back to the start node.
    pub fn trace(&self) -> SessionResult<PathTracer<'_>> {
        Ok(PathTracer::new(&self.engine)?)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            config: SearchConfig::default(),
            graph:  None,
            area:   None,
            start:  None,
            end:    None,
            engine: SearchEngine::new(),
        }
    }
}
