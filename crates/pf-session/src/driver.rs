//! Tick driver and observer callbacks: the boundary to a renderer.
//!
//! A [`Driver`] turns a started [`Session`] into a sequence of observer
//! callbacks, one tick at a time:
//!
//! 1. **Searching**: each tick performs `config.steps_per_tick` frontier
//!    pops and reports every touched node as a `referer → node` segment.
//! 2. When the search ends, `on_finished` fires once with the outcome.
//! 3. **Tracing**: on `PathFound`, each following tick reports one hop of
//!    the route, walking from the end node back to the start.
//!
//! Each `start` on the session begins a new animation, including a search
//! that was stepped to completion outside the driver.
//!
//! The driver owns no clock.  Call [`Driver::tick`] from an animation frame
//! callback, or [`Driver::run`] to drain everything at once.

use tracing::debug;

use pf_core::GeoPoint;
use pf_search::{Hop, Outcome, TraceCursor, Touched};

use crate::Session;

/// Callbacks invoked by [`Driver::tick`].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: segment printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl SearchObserver for Printer {
///     fn on_touched(&mut self, _t: &Touched, from: GeoPoint, to: GeoPoint) {
///         println!("explore {from} -> {to}");
///     }
/// }
/// ```
pub trait SearchObserver {
    /// A node's tentative distance improved; `from`/`to` are the positions
    /// of its referer and of the node itself.
    fn on_touched(&mut self, _touched: &Touched, _from: GeoPoint, _to: GeoPoint) {}

    /// The search reached a terminal state.  Fires exactly once per search.
    fn on_finished(&mut self, _outcome: Outcome) {}

    /// One hop of the final route, delivered end → start.
    fn on_route_hop(&mut self, _hop: &Hop, _from: GeoPoint, _to: GeoPoint) {}
}

/// A [`SearchObserver`] that does nothing.
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// What the driver will do on the next tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriverStatus {
    /// The session has no running or finished search.
    Idle,
    Searching,
    Tracing,
    /// Search over and route (if any) fully delivered.
    Done,
}

/// Totals returned by [`Driver::run`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverSummary {
    pub ticks:      u64,
    pub touched:    usize,
    pub route_hops: usize,
    pub outcome:    Option<Outcome>,
}

/// Paces a session's search and route trace for a renderer.
#[derive(Debug, Default)]
pub struct Driver {
    /// Engine generation this driver is animating; `None` before the first
    /// tick of a search.
    tracking: Option<u64>,
    notified: bool,
    cursor:   Option<TraceCursor>,
    summary:  DriverSummary,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget progress.  Happens on its own when the session starts a new
    /// search.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn summary(&self) -> DriverSummary {
        self.summary
    }

    /// Advance by one tick and report what happened to `observer`.
    ///
    /// Returns the status for the *next* tick.
    pub fn tick<O>(&mut self, session: &mut Session, observer: &mut O) -> DriverStatus
    where
        O: SearchObserver + ?Sized,
    {
        let engine = session.engine();
        if !engine.is_running() && !engine.finished() {
            return DriverStatus::Idle;
        }
        // Any new `start` since the last tick begins a fresh animation, even
        // if that search already ran to completion without us.
        let generation = engine.generation();
        if self.tracking != Some(generation) {
            self.reset();
            self.tracking = Some(generation);
        }

        self.summary.ticks += 1;

        if engine.is_running() {
            let batch = session.step_tick();
            let engine = session.engine();
            if let Some(graph) = engine.graph() {
                for t in &batch {
                    observer.on_touched(t, graph.position(t.referer), graph.position(t.node));
                }
            }
            self.summary.touched += batch.len();
        } else if let Some(cursor) = self.cursor.as_mut() {
            let engine = session.engine();
            if let (Some(hop), Some(graph)) = (cursor.advance(engine), engine.graph()) {
                observer.on_route_hop(&hop, graph.position(hop.from), graph.position(hop.to));
                self.summary.route_hops += 1;
            }
        }

        let engine = session.engine();
        if let Some(outcome) = engine.outcome().filter(|_| !self.notified) {
            self.notified = true;
            self.summary.outcome = Some(outcome);
            self.cursor = TraceCursor::new(engine).ok();
            debug!(
                ?outcome,
                ticks = self.summary.ticks,
                touched = self.summary.touched,
                "search animation finished"
            );
            observer.on_finished(outcome);
        }

        self.status(session)
    }

    fn status(&self, session: &Session) -> DriverStatus {
        let engine = session.engine();
        if engine.is_running() {
            DriverStatus::Searching
        } else if !engine.finished() {
            DriverStatus::Idle
        } else if self.cursor.is_some_and(|c| engine.parent(c.position()).is_some()) {
            DriverStatus::Tracing
        } else {
            DriverStatus::Done
        }
    }

    /// Tick until done (or idle) and return the totals.
    pub fn run<O>(&mut self, session: &mut Session, observer: &mut O) -> DriverSummary
    where
        O: SearchObserver + ?Sized,
    {
        while matches!(self.tick(session, observer), DriverStatus::Searching | DriverStatus::Tracing) {}
        self.summary
    }
}
