//! Unit tests for rb-network.
//!
//! Networks are built from hand-made segment records along the equator, so
//! one degree of longitude is `METERS_PER_DEGREE` metres.

#[cfg(test)]
mod helpers {
    use rb_core::{GeoPoint, SegmentId};
    use rb_geometry::SegmentRecord;

    use crate::{NetworkBuilder, RoadNetwork};

    /// Segment through `points` given as `(lat, lon)`, length from geometry.
    pub fn record(id: u32, points: &[(f64, f64)], number: Option<&str>) -> SegmentRecord {
        SegmentRecord::new(
            SegmentId(id),
            points.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect(),
            number.map(str::to_owned),
            None,
            None,
        )
        .unwrap()
    }

    /// A (0,0)-(0,1) and B (0,1)-(0,2), sharing their middle endpoint.
    pub fn collinear(a: Option<&str>, b: Option<&str>) -> Vec<SegmentRecord> {
        vec![
            record(0, &[(0.0, 0.0), (0.0, 1.0)], a),
            record(1, &[(0.0, 1.0), (0.0, 2.0)], b),
        ]
    }

    /// Like [`collinear`] but B starts `gap_deg` of longitude after A ends.
    pub fn with_gap(gap_deg: f64) -> Vec<SegmentRecord> {
        vec![
            record(0, &[(0.0, 0.0), (0.0, 1.0)], Some("M1")),
            record(1, &[(0.0, 1.0 + gap_deg), (0.0, 2.0)], Some("M1")),
        ]
    }

    pub fn build(records: &[SegmentRecord]) -> RoadNetwork {
        NetworkBuilder::new(5.0).build(records).unwrap()
    }
}

// ── Snapping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use rb_core::GeoPoint;

    use crate::snap::{cluster_endpoints, UnionFind};

    #[test]
    fn union_find_root_is_smallest_member() {
        let mut sets = UnionFind::new(5);
        sets.union(4, 2);
        sets.union(2, 3);
        assert_eq!(sets.find(4), 2);
        sets.union(3, 0);
        assert_eq!(sets.find(4), 0);
        let (labels, k) = sets.labels();
        assert_eq!(k, 2);
        assert_eq!(labels, vec![0, 1, 0, 0, 0]);
    }

    #[test]
    fn merges_within_tolerance_inclusive() {
        let a = GeoPoint::new(51.5, -0.1);
        let b = GeoPoint::new(51.5, -0.1 + 0.00004); // ~2.8 m east
        let d = a.distance_m(b);
        let (labels, k) = cluster_endpoints(&[a, b], d);
        assert_eq!(k, 1);
        assert_eq!(labels[0], labels[1]);

        let (_, k) = cluster_endpoints(&[a, b], d * 0.999);
        assert_eq!(k, 2);
    }

    #[test]
    fn merge_is_transitive() {
        // 0–1 and 1–2 are 4 m apart; 0–2 are 8 m apart.
        let step = 4.0 / rb_core::METERS_PER_DEGREE;
        let pts = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, step),
            GeoPoint::new(0.0, 2.0 * step),
        ];
        let (labels, k) = cluster_endpoints(&pts, 5.0);
        assert_eq!(k, 1);
        assert!(labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn grid_cells_do_not_hide_neighbours() {
        // Pairs straddling many cell boundaries at a high latitude.
        let tol = 5.0;
        let pts: Vec<GeoPoint> = (0..200)
            .flat_map(|i| {
                let p = GeoPoint::new(60.0 + i as f64 * 0.01, 10.0 + i as f64 * 0.013);
                let q = GeoPoint::new(p.lat + 0.00002, p.lon + 0.00003);
                [p, q]
            })
            .collect();
        let (labels, k) = cluster_endpoints(&pts, tol);
        assert_eq!(k, 200);
        for pair in labels.chunks_exact(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rb_core::{GeoPoint, LoadError, NodeId, SegmentId};

    use crate::{NetworkBuilder, RoadNetwork, RoadNetworkBuilder};

    use super::helpers::{build, collinear, record, with_gap};

    #[test]
    fn empty_low_level_build() {
        let net = RoadNetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
        assert_eq!(net.component_count(), 0);
        assert!(RoadNetwork::empty().is_empty());
    }

    #[test]
    fn debug_output_reports_sizes() {
        let net = build(&collinear(None, None));
        assert_eq!(format!("{net:?}"), "RoadNetwork { nodes: 3, edges: 4, components: 1 }");
    }

    #[test]
    fn records_must_sit_at_their_id() {
        let mut recs = collinear(None, None);
        recs.swap(0, 1);
        let err = NetworkBuilder::new(5.0).build(&recs).unwrap_err();
        assert!(matches!(err, LoadError::SegmentIdMismatch { position: 0, found: SegmentId(1) }));

        let recs = vec![record(7, &[(0.0, 0.0), (0.0, 1.0)], None)];
        assert!(matches!(
            NetworkBuilder::new(5.0).build(&recs),
            Err(LoadError::SegmentIdMismatch { position: 0, found: SegmentId(7) })
        ));
    }

    #[test]
    fn shared_endpoint_is_one_node() {
        let net = build(&collinear(Some("M1"), Some("M1")));
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 4); // bidirectional
        assert_eq!(net.component_count(), 1);
    }

    #[test]
    fn edges_carry_segment_length() {
        let recs = collinear(None, None);
        let net = build(&recs);
        for e in 0..net.edge_count() {
            let seg = net.edge_segment[e];
            assert_eq!(net.edge_length_m[e], recs[seg.index()].attrs.length_m);
        }
    }

    #[test]
    fn two_metre_gap_is_snapped() {
        let net = build(&with_gap(0.000018)); // ~2.0 m
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.component_count(), 1);

        // The merged node sits between the two endpoints.
        let mid = net
            .node_pos
            .iter()
            .find(|p| p.lon > 0.5 && p.lon < 1.5)
            .unwrap();
        assert!((mid.lon - 1.000009).abs() < 1e-9);
    }

    #[test]
    fn five_hundred_metre_gap_is_not_snapped() {
        let net = build(&with_gap(0.0045)); // ~500 m
        assert_eq!(net.node_count(), 4);
        assert_eq!(net.component_count(), 2);
    }

    #[test]
    fn no_orphan_nodes() {
        let recs = vec![
            record(0, &[(0.0, 0.0), (0.0, 1.0)], None),
            record(1, &[(0.0, 1.0), (0.5, 1.5), (1.0, 1.0)], None),
            record(2, &[(1.0, 1.0), (0.0, 0.0)], None),
            record(3, &[(5.0, 5.0), (5.0, 5.1)], None),
        ];
        let net = build(&recs);
        for n in 0..net.node_count() {
            assert!(net.out_degree(NodeId(n as u32)) > 0, "node {n} has no edges");
        }
    }

    #[test]
    fn adjacency_keeps_insertion_order() {
        let mut b = RoadNetworkBuilder::new();
        let hub = b.add_node(GeoPoint::new(0.0, 0.0));
        let x = b.add_node(GeoPoint::new(0.0, 1.0));
        let y = b.add_node(GeoPoint::new(1.0, 0.0));
        let z = b.add_node(GeoPoint::new(-1.0, 0.0));
        b.add_road(hub, z, 1.0, rb_core::SegmentId(0));
        b.add_road(hub, x, 1.0, rb_core::SegmentId(1));
        b.add_road(hub, y, 1.0, rb_core::SegmentId(2));
        let net = b.build();

        let targets: Vec<NodeId> = net.out_edges(hub).map(|e| net.edge_to[e.index()]).collect();
        assert_eq!(targets, vec![z, x, y]);
    }

    #[test]
    fn single_point_network_is_rejected() {
        // Start and end coincide, so there is only one distinct endpoint.
        let recs = vec![record(0, &[(0.0, 0.0), (0.01, 0.0), (0.0, 0.0)], None)];
        let err = NetworkBuilder::new(5.0).build(&recs).unwrap_err();
        assert!(matches!(err, LoadError::TooFewNodes(1)));
    }

    #[test]
    fn keep_largest_component_drops_islands() {
        let mut recs = collinear(None, None);
        recs.push(record(2, &[(10.0, 0.0), (10.0, 1.0)], None));

        let all = build(&recs);
        assert_eq!(all.node_count(), 5);
        assert_eq!(all.component_count(), 2);

        let pruned = NetworkBuilder::new(5.0)
            .keep_largest_component(true)
            .build(&recs)
            .unwrap();
        assert_eq!(pruned.node_count(), 3);
        assert_eq!(pruned.edge_count(), 4);
        assert_eq!(pruned.component_count(), 1);
        assert!(pruned.edge_segment.iter().all(|s| s.0 < 2));
    }
}

// ── Nearest-node projection ───────────────────────────────────────────────────

#[cfg(test)]
mod nearest {
    use rb_core::{GeoPoint, NodeId, QueryError};

    use crate::{PathFinder, RouteError};

    use super::helpers::{build, collinear};

    #[test]
    fn boundary_is_inclusive() {
        let net = build(&collinear(None, None));
        let q = GeoPoint::new(0.001, 0.0);
        let d = q.distance_m(GeoPoint::new(0.0, 0.0));

        let (node, dist) = net.nearest_node(q, d).unwrap();
        assert_eq!(net.node_pos[node.index()], GeoPoint::new(0.0, 0.0));
        assert_eq!(dist, d);

        assert!(net.nearest_node(q, d - 0.001).is_none());
    }

    #[test]
    fn picks_the_closest_node() {
        let net = build(&collinear(None, None));
        let (node, _) = net.nearest_node(GeoPoint::new(0.01, 1.2), 50_000.0).unwrap();
        assert_eq!(net.node_pos[node.index()], GeoPoint::new(0.0, 1.0));
    }

    #[test]
    fn ties_go_to_lower_node_id() {
        let mut b = crate::RoadNetworkBuilder::new();
        let east = b.add_node(GeoPoint::new(0.0, 0.001));
        let west = b.add_node(GeoPoint::new(0.0, -0.001));
        b.add_road(east, west, 222.0, rb_core::SegmentId(0));
        let net = b.build();

        let (node, _) = net.nearest_node(GeoPoint::new(0.0, 0.0), 1_000.0).unwrap();
        assert_eq!(node, NodeId(0));
    }

    #[test]
    fn rejects_unusable_limits() {
        let net = build(&collinear(None, None));
        let q = GeoPoint::new(0.0, 0.0);
        assert!(net.nearest_node(q, -1.0).is_none());
        assert!(net.nearest_node(q, f64::NAN).is_none());
    }

    #[test]
    fn pathfinder_projection_errors() {
        let net = build(&collinear(None, None));
        let finder = PathFinder::new(1_000.0, 1_000);

        assert_eq!(
            finder.project(&net, GeoPoint::new(f64::NAN, 0.0)),
            Err(RouteError::Query(QueryError::NonFiniteCoordinate)),
        );
        assert!(matches!(
            finder.project(&net, GeoPoint::new(95.0, 0.0)),
            Err(RouteError::Query(QueryError::InvalidLatLng(_))),
        ));
        assert!(matches!(
            finder.project(&net, GeoPoint::new(0.0, 50.0)),
            Err(RouteError::OutOfRange { .. }),
        ));
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use rb_core::{GeoPoint, NodeId, QueryError, SegmentId};

    use crate::{DijkstraRouter, RoadNetwork, RoadNetworkBuilder, RouteError, Router};

    /// Nodes 0..n in a chain, each link 100 m.
    fn chain(n: usize) -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let nodes: Vec<NodeId> = (0..n)
            .map(|i| b.add_node(GeoPoint::new(0.0, i as f64 * 0.001)))
            .collect();
        for (i, w) in nodes.windows(2).enumerate() {
            b.add_road(w[0], w[1], 100.0, SegmentId(i as u32));
        }
        b.build()
    }

    #[test]
    fn prefers_the_shorter_path() {
        // 0→1→2→4 = 300 m  vs  0→3→4 = 600 m
        let mut b = RoadNetworkBuilder::new();
        let n: Vec<NodeId> = [(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (1.0, 0.0), (1.0, 2.0)]
            .iter()
            .map(|&(lat, lon)| b.add_node(GeoPoint::new(lat, lon)))
            .collect();
        b.add_road(n[0], n[1], 100.0, SegmentId(0));
        b.add_road(n[1], n[2], 100.0, SegmentId(1));
        b.add_road(n[2], n[4], 100.0, SegmentId(2));
        b.add_road(n[0], n[3], 500.0, SegmentId(3));
        b.add_road(n[3], n[4], 100.0, SegmentId(4));
        let net = b.build();

        let path = DijkstraRouter::default().route(&net, n[0], n[4]).unwrap();
        assert_eq!(path.cost_mm, 300_000);
        let segs: Vec<u32> = path.edges.iter().map(|e| net.edge_segment[e.index()].0).collect();
        assert_eq!(segs, vec![0, 1, 2]);
    }

    #[test]
    fn same_node_is_a_trivial_path() {
        let net = chain(3);
        let path = DijkstraRouter::default().route(&net, NodeId(1), NodeId(1)).unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.cost_mm, 0);
    }

    #[test]
    fn equal_costs_take_the_first_discovered_path() {
        // Diamond 0–1–3 / 0–2–3 with identical weights; 0–1 is added first.
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.001, 0.001));
        let n2 = b.add_node(GeoPoint::new(-0.001, 0.001));
        let n3 = b.add_node(GeoPoint::new(0.0, 0.002));
        b.add_road(n0, n1, 150.0, SegmentId(0));
        b.add_road(n0, n2, 150.0, SegmentId(1));
        b.add_road(n1, n3, 150.0, SegmentId(2));
        b.add_road(n2, n3, 150.0, SegmentId(3));
        let net = b.build();

        for _ in 0..5 {
            let path = DijkstraRouter::default().route(&net, n0, n3).unwrap();
            assert_eq!(net.edge_to[path.edges[0].index()], n1);
        }
    }

    #[test]
    fn budget_exhaustion_is_a_query_error() {
        let net = chain(10);
        let err = DijkstraRouter::new(3).route(&net, NodeId(0), NodeId(9)).unwrap_err();
        assert_eq!(err, RouteError::Query(QueryError::BudgetExceeded { expansions: 3 }));

        // Reaching node 3 settles exactly three nodes first.
        assert!(DijkstraRouter::new(3).route(&net, NodeId(0), NodeId(3)).is_ok());
    }

    #[test]
    fn unreachable_target_is_not_connected() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        let x = b.add_node(GeoPoint::new(5.0, 0.0));
        let y = b.add_node(GeoPoint::new(5.0, 1.0));
        b.add_road(a, c, 1.0, SegmentId(0));
        b.add_road(x, y, 1.0, SegmentId(1));
        let net = b.build();

        assert!(!net.same_component(a, y));
        assert_eq!(
            DijkstraRouter::default().route(&net, a, y),
            Err(RouteError::NotConnected { from: a, to: y }),
        );
    }
}

// ── PathFinder + RouteAssembler scenarios ─────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use rb_core::GeoPoint;

    use crate::{PathFinder, RouteError};

    use super::helpers::{build, collinear, record, with_gap};

    fn finder() -> PathFinder {
        PathFinder::new(50_000.0, 1_000_000)
    }

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    #[test]
    fn collinear_segments_same_road() {
        let recs = collinear(Some("M1"), Some("M1"));
        let net = build(&recs);
        let l = recs[0].attrs.length_m;

        let route = finder().find_route(&net, &recs, p(0.0, 0.0), p(0.0, 2.0)).unwrap();
        assert!((route.distance_m - 2.0 * l).abs() < 1e-6);
        assert_eq!(route.roads, vec!["M1".to_owned()]);
        assert_eq!(route.coordinates, vec![p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0)]);
        assert_eq!(route.node_count, 3);
    }

    #[test]
    fn collinear_segments_different_roads_in_order() {
        let recs = collinear(Some("A1"), Some("A2"));
        let net = build(&recs);

        let fwd = finder().find_route(&net, &recs, p(0.0, 0.0), p(0.0, 2.0)).unwrap();
        assert_eq!(fwd.roads, vec!["A1".to_owned(), "A2".to_owned()]);

        let back = finder().find_route(&net, &recs, p(0.0, 2.0), p(0.0, 0.0)).unwrap();
        assert_eq!(back.roads, vec!["A2".to_owned(), "A1".to_owned()]);
        assert_eq!(back.coordinates, vec![p(0.0, 2.0), p(0.0, 1.0), p(0.0, 0.0)]);
        assert!(back.edges.iter().all(|e| !net.edge_forward[e.index()]));
    }

    #[test]
    fn unidentified_segments_are_left_out_of_roads() {
        let recs = collinear(None, Some("M4"));
        let net = build(&recs);
        let route = finder().find_route(&net, &recs, p(0.0, 0.0), p(0.0, 2.0)).unwrap();
        assert_eq!(route.roads, vec!["M4".to_owned()]);
    }

    #[test]
    fn snapped_gap_routes_across() {
        let recs = with_gap(0.000018);
        let net = build(&recs);
        let route = finder()
            .find_route(&net, &recs, p(0.0001, 0.0), p(0.0001, 2.0))
            .unwrap();

        let expected = recs[0].attrs.length_m + recs[1].attrs.length_m;
        assert!((route.distance_m - expected).abs() < 1e-6);
        assert_eq!(route.coordinates.first(), Some(&p(0.0001, 0.0)));
        assert_eq!(route.coordinates.last(), Some(&p(0.0001, 2.0)));
        assert_eq!(route.coordinates.len(), 6);
    }

    #[test]
    fn distant_segments_are_not_connected() {
        let recs = with_gap(0.0045);
        let net = build(&recs);
        let err = finder()
            .find_route(&net, &recs, p(0.0, 0.0), p(0.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, RouteError::NotConnected { .. }));
    }

    #[test]
    fn distance_is_sum_of_traversed_weights() {
        let recs = vec![
            record(0, &[(0.0, 0.0), (0.2, 0.5), (0.0, 1.0)], Some("A1")),
            record(1, &[(0.0, 1.0), (0.0, 2.0)], Some("A1")),
            record(2, &[(0.0, 0.0), (-1.0, 1.0), (0.0, 2.0)], Some("B9")),
        ];
        let net = build(&recs);
        let route = finder().find_route(&net, &recs, p(0.0, 0.0), p(0.0, 2.0)).unwrap();

        let sum: f64 = route.edges.iter().map(|e| net.edge_length_m[e.index()]).sum();
        assert!((route.distance_m - sum).abs() < 1e-9);
        // Interior vertices of the bent segment are part of the geometry.
        assert!(route.coordinates.contains(&p(0.2, 0.5)));
        assert_eq!(route.roads, vec!["A1".to_owned()]);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let recs = collinear(Some("A1"), Some("A2"));
        let net = build(&recs);
        let f = finder();
        let first = f.find_route(&net, &recs, p(0.01, 0.1), p(-0.01, 1.9)).unwrap();
        for _ in 0..10 {
            assert_eq!(f.find_route(&net, &recs, p(0.01, 0.1), p(-0.01, 1.9)).unwrap(), first);
        }
    }

    #[test]
    fn both_points_on_one_node() {
        let recs = collinear(Some("M1"), Some("M1"));
        let net = build(&recs);
        let route = finder()
            .find_route(&net, &recs, p(0.0001, 0.0), p(-0.0001, 0.0))
            .unwrap();
        assert_eq!(route.distance_m, 0.0);
        assert!(route.roads.is_empty());
        assert_eq!(route.node_count, 1);
        assert_eq!(
            route.coordinates,
            vec![p(0.0001, 0.0), p(0.0, 0.0), p(-0.0001, 0.0)],
        );
    }

    #[test]
    fn out_of_range_query_leaves_network_usable() {
        let recs = collinear(Some("M1"), Some("M1"));
        let net = build(&recs);
        let f = finder();
        assert!(matches!(
            f.find_route(&net, &recs, p(40.0, 40.0), p(0.0, 2.0)),
            Err(RouteError::OutOfRange { .. }),
        ));
        assert!(f.find_route(&net, &recs, p(0.0, 0.0), p(0.0, 2.0)).is_ok());
    }

    #[test]
    fn custom_router_plugs_in() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        use rb_core::NodeId;

        use crate::{DijkstraRouter, Path, RoadNetwork, Router};

        struct Counting {
            calls: Arc<AtomicUsize>,
            inner: DijkstraRouter,
        }

        impl Router for Counting {
            fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Result<Path, RouteError> {
                self.calls.fetch_add(1, Ordering::Relaxed);
                self.inner.route(network, from, to)
            }
        }

        let recs = collinear(Some("M1"), Some("M1"));
        let net = build(&recs);
        let calls = Arc::new(AtomicUsize::new(0));
        let f = PathFinder::with_router(
            50_000.0,
            Counting { calls: Arc::clone(&calls), inner: DijkstraRouter::default() },
        );

        let route = f.find_route(&net, &recs, p(0.0, 0.0), p(0.0, 2.0)).unwrap();
        assert_eq!(route, finder().find_route(&net, &recs, p(0.0, 0.0), p(0.0, 2.0)).unwrap());

        // Disconnected queries never reach the router.
        let split = with_gap(0.0045);
        let split_net = build(&split);
        assert!(f.find_route(&split_net, &split, p(0.0, 0.0), p(0.0, 2.0)).is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn missing_records_draw_straight_edges() {
        use crate::{DijkstraRouter, RouteAssembler, Router};

        let recs = collinear(Some("M1"), Some("M1"));
        let net = build(&recs);
        let from = net.nearest_node(p(0.0, 0.0), 1.0).unwrap().0;
        let to = net.nearest_node(p(0.0, 2.0), 1.0).unwrap().0;
        let path = DijkstraRouter::default().route(&net, from, to).unwrap();

        let route = RouteAssembler::new(&net, &[]).assemble(&path, p(0.0, 0.0), p(0.0, 2.0));
        assert_eq!(route.coordinates, vec![p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0)]);
        assert!(route.roads.is_empty());
        assert!((route.distance_m - 2.0 * recs[0].attrs.length_m).abs() < 1e-6);
    }
}
