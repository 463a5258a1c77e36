//! Route reconstruction: geometry, distance and road list for a [`Path`].

use rb_core::{EdgeId, GeoPoint};
use rb_geometry::SegmentRecord;

use crate::network::RoadNetwork;
use crate::router::Path;

/// An assembled route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Query start, the traversed edge geometries in travel order, query end.
    /// Consecutive identical points appear once.
    pub coordinates: Vec<GeoPoint>,
    /// Sum of the traversed edge weights, metres.
    pub distance_m:  f64,
    /// Road identifiers in travel order, consecutive repeats collapsed.
    pub roads:       Vec<String>,
    pub edges:       Vec<EdgeId>,
    /// Graph nodes on the path, endpoints included.
    pub node_count:  usize,
}

/// Turns node-level search results into [`RouteResult`]s.
///
/// Borrows the network and the records its edges refer to; both should come
/// from the same build.  An edge whose segment is missing from `records`
/// is drawn as a straight line between its nodes.
pub struct RouteAssembler<'a> {
    network: &'a RoadNetwork,
    records: &'a [SegmentRecord],
}

impl<'a> RouteAssembler<'a> {
    pub fn new(network: &'a RoadNetwork, records: &'a [SegmentRecord]) -> Self {
        Self { network, records }
    }

    pub fn assemble(&self, path: &Path, start: GeoPoint, end: GeoPoint) -> RouteResult {
        let net = self.network;
        let mut coordinates = Vec::new();
        let mut roads: Vec<String> = Vec::new();
        let mut distance_m = 0.0;

        push_point(&mut coordinates, start);
        if path.is_trivial() {
            push_point(&mut coordinates, net.node_pos[path.source.index()]);
        }

        for &edge in &path.edges {
            let e = edge.index();
            distance_m += net.edge_length_m[e];

            // Records from another build: draw the edge node to node.
            let Some(rec) = self.records.get(net.edge_segment[e].index()) else {
                push_point(&mut coordinates, net.node_pos[net.edge_from[e].index()]);
                push_point(&mut coordinates, net.node_pos[net.edge_to[e].index()]);
                continue;
            };
            if net.edge_forward[e] {
                rec.points.iter().for_each(|&p| push_point(&mut coordinates, p));
            } else {
                rec.points.iter().rev().for_each(|&p| push_point(&mut coordinates, p));
            }

            if let Some(id) = rec.road_id() {
                if roads.last().map(String::as_str) != Some(id) {
                    roads.push(id.to_owned());
                }
            }
        }

        push_point(&mut coordinates, end);

        RouteResult {
            coordinates,
            distance_m,
            roads,
            edges: path.edges.clone(),
            node_count: path.edges.len() + 1,
        }
    }
}

fn push_point(points: &mut Vec<GeoPoint>, p: GeoPoint) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}
