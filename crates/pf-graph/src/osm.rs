//! OSM PBF loader, enabled with the `osm` Cargo feature.
//!
//! ```ignore
//! use std::path::Path;
//! use pf_graph::osm::load_from_pbf;
//!
//! let graph = load_from_pbf(Path::new("munich.osm.pbf"), 1.0)?;
//! ```
//!
//! Only car-accessible `highway=*` ways become edges.  Node keys are the
//! original OSM node ids, so a nearest-node resolver backed by the same
//! extract yields keys that line up with this graph.
//!
//! The file is read once.  Node coordinates are buffered because ways
//! reference nodes by id and may appear before the nodes they use in some
//! extracts; the buffer is dropped before the graph is built.

use std::path::Path;

use osmpbf::{Element, ElementReader};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use pf_core::{GeoPoint, NodeKey};

use crate::{Graph, GraphBuilder, GraphError, GraphResult};

/// Travel direction permitted on a way, relative to its node order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Both,
    Forward,
    /// `oneway=-1`: traffic runs against the node order.
    Backward,
}

struct RoadWay {
    refs:      Vec<i64>,
    direction: Direction,
}

/// One road segment between consecutive way nodes, oriented in the
/// permitted direction when `oneway`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    pub from:   i64,
    pub to:     i64,
    pub oneway: bool,
}

/// Load a road graph from an OSM PBF file.
///
/// Edge weights are segment lengths in metres times `weight_scale`.
/// Segments whose nodes are missing from the extract (clipped at the
/// boundary) are skipped rather than reported as dangling.
pub fn load_from_pbf(path: &Path, weight_scale: f64) -> GraphResult<Graph> {
    let reader = ElementReader::from_path(path).map_err(|e| GraphError::Osm(e.to_string()))?;

    let mut coords: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut ways: Vec<RoadWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                coords.insert(n.id(), GeoPoint::new(n.lat() as f32, n.lon() as f32));
            }
            Element::DenseNode(n) => {
                coords.insert(n.id(), GeoPoint::new(n.lat() as f32, n.lon() as f32));
            }
            Element::Way(w) => {
                let tags: Vec<(&str, &str)> = w.tags().collect();
                if let Some(direction) = road_direction(&tags) {
                    ways.push(RoadWay { refs: w.refs().collect(), direction });
                }
            }
            _ => {}
        })
        .map_err(|e| GraphError::Osm(e.to_string()))?;

    let mut segments: Vec<Segment> = Vec::new();
    let mut clipped = 0usize;
    for way in &ways {
        clipped += way_segments(&way.refs, way.direction, |id| coords.contains_key(&id), &mut segments);
    }
    drop(ways);

    // Road nodes in id order, so NodeIds are reproducible run to run.
    let mut keys: Vec<i64> = segments.iter().flat_map(|s| [s.from, s.to]).collect();
    keys.sort_unstable();
    keys.dedup();

    let edge_hint: usize = segments.iter().map(|s| if s.oneway { 1 } else { 2 }).sum();
    let mut builder = GraphBuilder::with_capacity(keys.len(), edge_hint).weight_scale(weight_scale);
    for key in &keys {
        builder.add_node(NodeKey(*key), coords[key]);
    }
    drop(coords);

    for s in segments {
        builder.add_road_by_distance(NodeKey(s.from), NodeKey(s.to), s.oneway);
    }

    let graph = builder.build()?;
    debug!(clipped, "skipped segments clipped at the extract boundary");
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded OSM road graph"
    );
    Ok(graph)
}

/// Permitted direction for a car on a way with these tags, or `None` if the
/// way is not a drivable road.
pub(crate) fn road_direction(tags: &[(&str, &str)]) -> Option<Direction> {
    let tag = |name: &str| tags.iter().find(|(k, _)| *k == name).map(|(_, v)| *v);

    let highway = tag("highway")?;
    if matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track" | "bridleway"
            | "corridor" | "proposed" | "construction" | "platform" | "elevator"
    ) || matches!(tag("motor_vehicle").or(tag("access")), Some("no" | "private"))
    {
        return None;
    }

    let direction = match tag("oneway") {
        Some("yes" | "1" | "true") => Direction::Forward,
        Some("-1" | "reverse") => Direction::Backward,
        Some("no" | "0" | "false") => Direction::Both,
        // Motorways and roundabouts are one-way unless tagged otherwise.
        _ if matches!(highway, "motorway" | "motorway_link") => Direction::Forward,
        _ if tag("junction") == Some("roundabout") => Direction::Forward,
        _ => Direction::Both,
    };
    Some(direction)
}

/// Append the segments of one way to `out`.  Pairs with an endpoint that
/// `known` rejects (clipped at the extract boundary) are skipped; their
/// count is returned.
pub(crate) fn way_segments(
    refs:      &[i64],
    direction: Direction,
    known:     impl Fn(i64) -> bool,
    out:       &mut Vec<Segment>,
) -> usize {
    let mut clipped = 0;
    for pair in refs.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if !(known(a) && known(b)) {
            clipped += 1;
            continue;
        }
        out.push(match direction {
            Direction::Both => Segment { from: a, to: b, oneway: false },
            Direction::Forward => Segment { from: a, to: b, oneway: true },
            Direction::Backward => Segment { from: b, to: a, oneway: true },
        });
    }
    clipped
}
