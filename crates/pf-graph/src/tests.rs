//! Unit tests for pf-graph.
//!
//! All tests use hand-crafted graphs so they run without any OSM file.

#[cfg(test)]
mod helpers {
    use pf_core::{GeoPoint, NodeKey};
    use crate::{Graph, GraphBuilder};

    /// Small grid graph.
    ///
    /// Nodes (lat, lon):
    ///   10:(0,0)  11:(0,1)  12:(0,2)
    ///   13:(1,0)            14:(1,2)
    ///
    /// Two-way roads: 10-11, 11-12, 10-13, 12-14, 13-14
    pub fn grid_graph() -> Graph {
        let mut b = GraphBuilder::new();
        b.add_node(NodeKey(10), GeoPoint::new(0.0, 0.0));
        b.add_node(NodeKey(11), GeoPoint::new(0.0, 1.0));
        b.add_node(NodeKey(12), GeoPoint::new(0.0, 2.0));
        b.add_node(NodeKey(13), GeoPoint::new(1.0, 0.0));
        b.add_node(NodeKey(14), GeoPoint::new(1.0, 2.0));

        b.add_road(NodeKey(10), NodeKey(11), 10.0);
        b.add_road(NodeKey(11), NodeKey(12), 10.0);
        b.add_road(NodeKey(12), NodeKey(14), 10.0);
        b.add_road(NodeKey(10), NodeKey(13), 50.0);
        b.add_road(NodeKey(13), NodeKey(14), 10.0);
        b.build().unwrap()
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use pf_core::{GeoPoint, NodeId, NodeKey};
    use crate::GraphBuilder;

    #[test]
    fn empty_build() {
        let g = GraphBuilder::new().build().unwrap();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn empty_constructor_matches_empty_build() {
        let g = crate::Graph::empty();
        assert!(g.is_empty());
        assert!(g.nearest(GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn single_road() {
        let mut b = GraphBuilder::new();
        b.add_node(NodeKey(1), GeoPoint::new(30.0, -88.0));
        b.add_node(NodeKey(2), GeoPoint::new(30.1, -88.0));
        b.add_road(NodeKey(1), NodeKey(2), 1_000.0);
        let g = b.build().unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        let e = g.edge(g.out_edges(NodeId(0)).next().unwrap());
        assert!(e.bidirectional);
        assert_eq!(e.weight, 1_000.0);
    }

    #[test]
    fn csr_out_edges() {
        let g = super::helpers::grid_graph();
        let id = |k| g.node_id(NodeKey(k)).unwrap();

        assert_eq!(g.out_degree(id(10)), 2);
        assert_eq!(g.out_degree(id(11)), 2);
        assert_eq!(g.out_degree(id(12)), 2);
        assert_eq!(g.out_degree(id(13)), 2);
        assert_eq!(g.out_degree(id(14)), 2);

        for e in g.out_edges(id(10)) {
            assert_eq!(g.edge(e).from, id(10));
        }
        assert!(g.out_edges(id(10)).any(|e| g.edge_target(e) == id(11)));
    }

    #[test]
    fn out_edges_keep_insertion_order() {
        let g = super::helpers::grid_graph();
        let n10 = g.node(NodeKey(10)).unwrap();
        let targets: Vec<NodeKey> = n10
            .out_edges()
            .map(|e| g.key(g.edge_target(e)))
            .collect();
        assert_eq!(targets, vec![NodeKey(11), NodeKey(13)]);
        assert_eq!(n10.out_degree(), 2);
    }

    #[test]
    fn directed_only_edge() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(NodeKey(1), GeoPoint::new(0.0, 0.0));
        let c = b.add_node(NodeKey(2), GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(NodeKey(1), NodeKey(2), 100.0);
        let g = b.build().unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.out_degree(a), 1);
        assert_eq!(g.out_degree(c), 0);
        assert!(!g.edge(g.out_edges(a).next().unwrap()).bidirectional);
    }

    #[test]
    fn asymmetric_weights_allowed() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(NodeKey(1), GeoPoint::new(0.0, 0.0));
        let c = b.add_node(NodeKey(2), GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(NodeKey(1), NodeKey(2), 3.0);
        b.add_directed_edge(NodeKey(2), NodeKey(1), 7.0);
        let g = b.build().unwrap();
        let ac = g.out_edges(a).next().unwrap();
        let ca = g.out_edges(c).next().unwrap();
        assert_eq!(g.edge_weight(ac), 3.0);
        assert_eq!(g.edge_weight(ca), 7.0);
    }

    #[test]
    fn distance_weight_uses_scale() {
        let mut b = GraphBuilder::new().weight_scale(2.0);
        let a = b.add_node(NodeKey(1), GeoPoint::new(30.0, -88.0));
        b.add_node(NodeKey(2), GeoPoint::new(31.0, -88.0));
        b.add_road_by_distance(NodeKey(1), NodeKey(2), true);
        let g = b.build().unwrap();
        assert_eq!(g.edge_count(), 1);
        let w = g.edge_weight(g.out_edges(a).next().unwrap());
        assert!((w - 2.0 * 111_195.0).abs() < 1_000.0, "got {w}");
    }
}

// ── Integrity validation ──────────────────────────────────────────────────────

#[cfg(test)]
mod integrity {
    use pf_core::{GeoPoint, NodeKey};
    use crate::{EdgeSpec, GraphBuilder, GraphError, IntegrityViolation, NodeSpec, load_graph};

    fn node(k: i64) -> NodeSpec {
        NodeSpec { key: NodeKey(k), pos: GeoPoint::new(0.0, k as f32 * 0.01) }
    }

    fn edge(from: i64, to: i64, w: f64) -> EdgeSpec {
        EdgeSpec { from: NodeKey(from), to: NodeKey(to), weight: Some(w), oneway: false }
    }

    #[test]
    fn load_graph_accepts_valid_input() {
        let g = load_graph([node(1), node(2), node(3)], [edge(1, 2, 1.0), edge(2, 3, 1.0)]).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn dangling_endpoint_rejected() {
        let err = load_graph([node(1), node(2)], [edge(1, 9, 1.0)]).unwrap_err();
        match err {
            GraphError::Integrity(IntegrityViolation::DanglingEndpoint { missing, .. }) => {
                assert_eq!(missing, NodeKey(9));
            }
            other => panic!("expected dangling endpoint, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_key_rejected() {
        let err = load_graph([node(1), node(1)], []).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Integrity(IntegrityViolation::DuplicateNode(NodeKey(1)))
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let err = load_graph([node(1), node(2)], [edge(1, 2, -0.5)]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Integrity(IntegrityViolation::InvalidWeight { .. })
        ));
    }

    #[test]
    fn nan_weight_rejected() {
        let mut b = GraphBuilder::new();
        b.add_node(NodeKey(1), GeoPoint::new(0.0, 0.0));
        b.add_node(NodeKey(2), GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(NodeKey(1), NodeKey(2), f64::NAN);
        assert!(matches!(b.build(), Err(GraphError::Integrity(_))));
    }

    #[test]
    fn integrity_error_names_the_edge() {
        let err = load_graph([node(1)], [edge(1, 2, 1.0)]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("#1 -> #2"), "{msg}");
        assert!(msg.contains("missing node #2"), "{msg}");
    }
}

// ── Lookup ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lookup {
    use pf_core::{GeoPoint, NodeKey};

    #[test]
    fn node_by_key() {
        let g = super::helpers::grid_graph();
        let n = g.node(NodeKey(12)).unwrap();
        assert_eq!(n.key, NodeKey(12));
        assert_eq!(n.pos, GeoPoint::new(0.0, 2.0));
        assert_eq!(g.key(n.id), NodeKey(12));
        assert!(g.contains(NodeKey(12)));
    }

    #[test]
    fn absent_key_is_none_not_error() {
        let g = super::helpers::grid_graph();
        assert!(g.node(NodeKey(999)).is_none());
        assert!(g.node_id(NodeKey(999)).is_none());
        assert!(!g.contains(NodeKey(999)));
    }

    #[test]
    fn nodes_iterates_in_id_order() {
        let g = super::helpers::grid_graph();
        let keys: Vec<i64> = g.nodes().map(|n| n.key.0).collect();
        assert_eq!(keys, vec![10, 11, 12, 13, 14]);
    }
}

// ── Spatial queries ───────────────────────────────────────────────────────────

#[cfg(test)]
mod spatial {
    use pf_core::{GeoPoint, NodeKey};

    #[test]
    fn nearest_exact_position() {
        let g = super::helpers::grid_graph();
        let id = g.nearest(GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(g.key(id), NodeKey(10));
    }

    #[test]
    fn nearest_between_nodes() {
        let g = super::helpers::grid_graph();
        let near_10 = g.nearest(GeoPoint::new(0.0, 0.4)).unwrap();
        assert_eq!(g.key(near_10), NodeKey(10));
        let near_11 = g.nearest(GeoPoint::new(0.0, 0.6)).unwrap();
        assert_eq!(g.key(near_11), NodeKey(11));
    }

    #[test]
    fn k_nearest_order() {
        let g = super::helpers::grid_graph();
        let nearest = g.k_nearest(GeoPoint::new(0.0, 0.0), 2);
        assert_eq!(g.key(nearest[0]), NodeKey(10));
        // 11 and 13 are equidistant in lat/lon; either is valid.
        let second = g.key(nearest[1]);
        assert!(second == NodeKey(11) || second == NodeKey(13));
    }
}

// ── Cropping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod crop {
    use pf_core::{BoundingBox, GeoPoint, NodeKey};
    use crate::GraphError;

    fn left_half() -> BoundingBox {
        BoundingBox::new(GeoPoint::new(-0.5, -0.5), GeoPoint::new(1.5, 1.5))
    }

    #[test]
    fn keeps_inside_nodes_and_internal_edges() {
        let g = super::helpers::grid_graph();
        let c = g.crop(left_half(), NodeKey(10)).unwrap();
        // 10, 11, 13 are inside; 12 and 14 (lon = 2) are not.
        assert_eq!(c.node_count(), 3);
        assert!(c.contains(NodeKey(11)));
        assert!(!c.contains(NodeKey(12)));
        // Two-way roads 10-11 and 10-13 survive: 4 directed edges.
        assert_eq!(c.edge_count(), 4);
    }

    #[test]
    fn hint_outside_area_fails() {
        let g = super::helpers::grid_graph();
        let err = g.crop(left_half(), NodeKey(14)).unwrap_err();
        assert!(matches!(err, GraphError::HintOutsideArea(NodeKey(14))));
    }

    #[test]
    fn unknown_hint_fails() {
        let g = super::helpers::grid_graph();
        let err = g.crop(left_half(), NodeKey(77)).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(NodeKey(77))));
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sources {
    use std::sync::Arc;

    use pf_core::{BoundingBox, GeoPoint, NodeKey};
    use crate::{Graph, GraphError, GraphResult, GraphSource, InMemorySource, NearestNodeResolver};

    #[test]
    fn graph_resolves_nearest() {
        let g = super::helpers::grid_graph();
        let r = g.resolve_nearest(GeoPoint::new(0.9, 2.1)).unwrap();
        assert_eq!(r.key, NodeKey(14));
        assert_eq!(r.pos, GeoPoint::new(1.0, 2.0));
    }

    #[test]
    fn empty_graph_cannot_resolve() {
        let err = Graph::empty().resolve_nearest(GeoPoint::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, GraphError::EmptyNetwork));
    }

    #[test]
    fn in_memory_source_crops() {
        let src = InMemorySource::new(Arc::new(super::helpers::grid_graph()));
        let bbox = BoundingBox::around(GeoPoint::new(0.0, 0.0), 50.0);
        let g = src.fetch_graph(bbox, NodeKey(10)).unwrap();
        // 50 km is ~0.45°: only node 10 itself is inside.
        assert_eq!(g.node_count(), 1);
        assert_eq!(src.network().node_count(), 5);
        assert_eq!(src.resolve_nearest(GeoPoint::new(0.0, 1.1)).unwrap().key, NodeKey(11));
    }

    #[test]
    fn closure_source_surfaces_failure() {
        let failing = |_: BoundingBox, _: NodeKey| -> GraphResult<Graph> {
            Err(GraphError::Fetch("upstream timed out".into()))
        };
        let bbox = BoundingBox::around(GeoPoint::new(0.0, 0.0), 1.0);
        let err = failing.fetch_graph(bbox, NodeKey(1)).unwrap_err();
        assert!(err.to_string().contains("upstream timed out"));
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_loader {
    use std::io::Cursor;

    use pf_core::NodeKey;
    use crate::{GraphError, load_csv};

    const NODES: &str = "\
key,lat,lon\n\
1,0.0,0.0\n\
2,0.0,0.001\n\
3,0.001,0.001\n\
";

    #[test]
    fn loads_explicit_and_derived_weights() {
        let edges = "from,to,weight,oneway\n1,2,5.0,false\n2,3,,true\n";
        let g = load_csv(Cursor::new(NODES), Cursor::new(edges), 1.0).unwrap();
        assert_eq!(g.node_count(), 3);
        // 1-2 two-way (2 edges) + 2->3 one-way (1 edge)
        assert_eq!(g.edge_count(), 3);

        let n2 = g.node_id(NodeKey(2)).unwrap();
        let to_3 = g
            .out_edges(n2)
            .find(|&e| g.key(g.edge_target(e)) == NodeKey(3))
            .unwrap();
        // 0.001° of latitude ≈ 111 m
        let w = g.edge_weight(to_3);
        assert!((w - 111.2).abs() < 1.0, "got {w}");
    }

    #[test]
    fn empty_oneway_means_two_way() {
        let edges = "from,to,weight,oneway\n1,2,5.0,\n";
        let g = load_csv(Cursor::new(NODES), Cursor::new(edges), 1.0).unwrap();
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn dangling_csv_edge_is_integrity_error() {
        let edges = "from,to,weight,oneway\n1,42,1.0,false\n";
        let err = load_csv(Cursor::new(NODES), Cursor::new(edges), 1.0).unwrap_err();
        assert!(matches!(err, GraphError::Integrity(_)));
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let nodes = "key,lat,lon\nabc,0.0,0.0\n";
        let err = load_csv(Cursor::new(nodes), Cursor::new("from,to,weight,oneway\n"), 1.0)
            .unwrap_err();
        assert!(matches!(err, GraphError::Parse(_)));
    }
}

// ── OSM tag rules ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "osm"))]
mod osm_tags {
    use pf_core::{GeoPoint, NodeKey};

    use crate::GraphBuilder;
    use crate::osm::{Direction, Segment, road_direction, way_segments};

    #[test]
    fn non_roads_are_skipped() {
        assert_eq!(road_direction(&[("building", "yes")]), None);
        assert_eq!(road_direction(&[("highway", "footway")]), None);
        assert_eq!(road_direction(&[("highway", "service"), ("access", "private")]), None);
    }

    #[test]
    fn explicit_oneway_tags() {
        let dir = |v| road_direction(&[("highway", "residential"), ("oneway", v)]);
        assert_eq!(dir("yes"), Some(Direction::Forward));
        assert_eq!(dir("-1"), Some(Direction::Backward));
        assert_eq!(dir("no"), Some(Direction::Both));
    }

    #[test]
    fn implicit_oneway_roads() {
        assert_eq!(road_direction(&[("highway", "motorway")]), Some(Direction::Forward));
        assert_eq!(
            road_direction(&[("highway", "primary"), ("junction", "roundabout")]),
            Some(Direction::Forward)
        );
        assert_eq!(
            road_direction(&[("highway", "motorway_link"), ("oneway", "no")]),
            Some(Direction::Both)
        );
        assert_eq!(road_direction(&[("highway", "residential")]), Some(Direction::Both));
    }

    #[test]
    fn two_way_ways_become_bidirectional_roads() {
        let mut segs = Vec::new();
        let clipped = way_segments(&[1, 2, 3], Direction::Both, |_| true, &mut segs);
        assert_eq!(clipped, 0);
        assert_eq!(
            segs,
            vec![
                Segment { from: 1, to: 2, oneway: false },
                Segment { from: 2, to: 3, oneway: false },
            ]
        );

        let mut b = GraphBuilder::new();
        for k in 1..=3 {
            b.add_node(NodeKey(k), GeoPoint::new(0.0, k as f32 * 0.001));
        }
        for s in &segs {
            b.add_road_by_distance(NodeKey(s.from), NodeKey(s.to), s.oneway);
        }
        let g = b.build().unwrap();
        assert_eq!(g.edge_count(), 4);
        for i in 0..g.edge_count() as u32 {
            assert!(g.edge(pf_core::EdgeId(i)).bidirectional);
        }
    }

    #[test]
    fn reversed_ways_flip_and_clipped_pairs_are_skipped() {
        let mut segs = Vec::new();
        let clipped = way_segments(&[1, 2, 99, 3], Direction::Backward, |id| id != 99, &mut segs);
        assert_eq!(clipped, 2);
        assert_eq!(segs, vec![Segment { from: 2, to: 1, oneway: true }]);
    }
}
