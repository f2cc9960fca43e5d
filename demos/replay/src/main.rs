//! replay — headless run of the stepwise route search.
//!
//! Loads a road network from CSV, picks a start and an end point by
//! coordinates, and drives the search tick by tick the way an animated map
//! would.  Explored segments and route hops are logged; the final route is
//! printed to stdout as JSON.
//!
//! Run with:
//!   cargo run -p replay
//!   cargo run -p replay -- <nodes.csv> <edges.csv> [config.json]
//!
//! Set `RUST_LOG=replay=debug` to see every segment.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde_json::json;
use tracing::{debug, info};

use pf_core::{GeoPoint, SearchConfig};
use pf_graph::{InMemorySource, load_csv_files};
use pf_search::{Hop, Outcome, Touched};
use pf_session::{Driver, SearchObserver, Session};

// ── Constants ─────────────────────────────────────────────────────────────────

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// South-west corner of the sample grid.
const START_POINT: GeoPoint = GeoPoint { lat: 48.1301, lon: 11.5602 };
/// North-east area of the sample grid.
const END_POINT:   GeoPoint = GeoPoint { lat: 48.1399, lon: 11.5774 };

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ReplayObserver {
    explored: usize,
    hops:     usize,
}

impl SearchObserver for ReplayObserver {
    fn on_touched(&mut self, t: &Touched, from: GeoPoint, to: GeoPoint) {
        self.explored += 1;
        debug!(node = %t.node, distance = t.distance, %from, %to, "explore");
    }

    fn on_finished(&mut self, outcome: Outcome) {
        info!(?outcome, explored = self.explored, "search finished");
    }

    fn on_route_hop(&mut self, hop: &Hop, from: GeoPoint, to: GeoPoint) {
        self.hops += 1;
        debug!(from_node = %hop.from, to_node = %hop.to, %from, %to, "route hop");
    }
}

// ── Inputs ────────────────────────────────────────────────────────────────────

struct Inputs {
    nodes:  PathBuf,
    edges:  PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Inputs> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok(Inputs {
            nodes:  Path::new(DATA_DIR).join("nodes.csv"),
            edges:  Path::new(DATA_DIR).join("edges.csv"),
            config: Some(Path::new(DATA_DIR).join("config.json")),
        }),
        [nodes, edges] => Ok(Inputs { nodes: nodes.into(), edges: edges.into(), config: None }),
        [nodes, edges, config] => Ok(Inputs {
            nodes:  nodes.into(),
            edges:  edges.into(),
            config: Some(config.into()),
        }),
        _ => bail!("usage: replay [<nodes.csv> <edges.csv> [config.json]]"),
    }
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: SearchConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("replay=info".parse()?)
                .add_directive("pf_session=info".parse()?),
        )
        .init();

    let inputs = parse_args()?;
    let config = load_config(inputs.config.as_deref())?;
    info!(?config, "configuration");

    // 1. Full network; selections crop it to the area around the start.
    let network = load_csv_files(&inputs.nodes, &inputs.edges, config.weight_scale)?;
    let source = InMemorySource::new(Arc::new(network));

    // 2. Endpoints.
    let mut session = Session::new(config)?;
    let start = session.select_start(&source, &source, START_POINT)?;
    let end = session.select_end(&source, END_POINT)?;
    info!(start = %start.key, end = %end.key, "endpoints selected");

    // 3. Drive the search and the route trace.
    session.start()?;
    let t0 = Instant::now();
    let mut observer = ReplayObserver::default();
    let summary = Driver::new().run(&mut session, &mut observer);
    info!(
        ticks = summary.ticks,
        touched = summary.touched,
        route_hops = observer.hops,
        elapsed_us = t0.elapsed().as_micros() as u64,
        "replay complete"
    );

    // 4. Report.
    let report = match summary.outcome {
        Some(Outcome::PathFound) => {
            let route = session.route()?;
            let graph = session.engine().graph().context("finished search has no graph")?;
            let nodes: Vec<_> = route
                .nodes
                .iter()
                .map(|&n| json!({ "key": graph.key(n), "pos": graph.position(n) }))
                .collect();
            json!({
                "outcome":    "path_found",
                "start":      start.key,
                "end":        end.key,
                "total_cost": route.total_cost,
                "hops":       route.hop_count(),
                "ticks":      summary.ticks,
                "explored":   summary.touched,
                "route":      nodes,
            })
        }
        Some(Outcome::Unreachable) => json!({
            "outcome":  "unreachable",
            "start":    start.key,
            "end":      end.key,
            "ticks":    summary.ticks,
            "explored": summary.touched,
        }),
        None => bail!("search did not run"),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
