//! Segment records → snapped, immutable road network.

use std::time::Instant;

use tracing::info;

use rb_core::{GeoPoint, LoadError, LoadResult, NodeId};
use rb_geometry::{check_segment_ids, SegmentRecord};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::snap::{cluster_endpoints, UnionFind};

/// Default endpoint snap tolerance, metres.
pub const DEFAULT_SNAP_TOLERANCE_M: f64 = 5.0;

/// Builds a [`RoadNetwork`] with one bidirectional edge per segment.
///
/// Each segment is an edge between its first and last point; the interior
/// polyline stays with the record and is only used when a route is drawn.
/// Endpoints closer than the snap tolerance (inclusive) become one node,
/// placed at the centroid of the endpoints it unifies.
///
/// The resulting graph may have several connected components.  That is a
/// property of the data, not a build error, unless
/// [`keep_largest_component`](Self::keep_largest_component) is set, in
/// which case every segment outside the largest component is left out.
#[derive(Clone, Debug)]
pub struct NetworkBuilder {
    snap_tolerance_m:       f64,
    keep_largest_component: bool,
}

impl NetworkBuilder {
    pub fn new(snap_tolerance_m: f64) -> Self {
        Self { snap_tolerance_m, keep_largest_component: false }
    }

    pub fn keep_largest_component(mut self, keep: bool) -> Self {
        self.keep_largest_component = keep;
        self
    }

    /// Build the network over `records`.
    ///
    /// Edges refer back to the records by id for their geometry, so
    /// `records[i].id` must equal `SegmentId(i)`.
    ///
    /// # Errors
    ///
    /// - [`LoadError::SegmentIdMismatch`] if a record is out of place.
    /// - [`LoadError::TooFewNodes`] if fewer than two distinct (snapped)
    ///   endpoints remain.
    pub fn build(&self, records: &[SegmentRecord]) -> LoadResult<RoadNetwork> {
        let started = Instant::now();
        check_segment_ids(records)?;

        let endpoints: Vec<GeoPoint> = records
            .iter()
            .flat_map(|r| [r.start(), r.end()])
            .collect();
        let (cluster_of, cluster_count) = cluster_endpoints(&endpoints, self.snap_tolerance_m);
        if cluster_count < 2 {
            return Err(LoadError::TooFewNodes(cluster_count));
        }

        // Optionally restrict to the largest component of the cluster graph.
        let keep: Vec<bool> = if self.keep_largest_component {
            largest_component_mask(&cluster_of, cluster_count)
        } else {
            vec![true; cluster_count]
        };

        // Dense node ids over kept clusters, in cluster order.
        let mut node_of_cluster = vec![NodeId::INVALID; cluster_count];
        let mut sums = Vec::new();
        for (c, &k) in keep.iter().enumerate() {
            if k {
                node_of_cluster[c] = NodeId(sums.len() as u32);
                sums.push((0.0f64, 0.0f64, 0u32));
            }
        }
        if sums.len() < 2 {
            return Err(LoadError::TooFewNodes(sums.len()));
        }
        for (p, &c) in endpoints.iter().zip(&cluster_of) {
            let node = node_of_cluster[c as usize];
            if node.is_valid() {
                let s = &mut sums[node.index()];
                s.0 += p.lat;
                s.1 += p.lon;
                s.2 += 1;
            }
        }

        let mut b = RoadNetworkBuilder::with_capacity(sums.len(), records.len() * 2);
        for (lat, lon, n) in &sums {
            b.add_node(GeoPoint::new(lat / f64::from(*n), lon / f64::from(*n)));
        }
        for (i, rec) in records.iter().enumerate() {
            let from = node_of_cluster[cluster_of[2 * i] as usize];
            let to = node_of_cluster[cluster_of[2 * i + 1] as usize];
            if from.is_valid() && to.is_valid() {
                b.add_road(from, to, rec.attrs.length_m, rec.id);
            }
        }
        let network = b.build();

        info!(
            segments = records.len(),
            endpoints = endpoints.len(),
            nodes = network.node_count(),
            edges = network.edge_count(),
            components = network.component_count(),
            snapped = endpoints.len() - cluster_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "road network built",
        );
        Ok(network)
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SNAP_TOLERANCE_M)
    }
}

/// Mark the clusters belonging to the component with the most clusters
/// (lowest label on ties).  Segment `i` links clusters `2i` and `2i + 1`.
fn largest_component_mask(cluster_of: &[u32], cluster_count: usize) -> Vec<bool> {
    let mut sets = UnionFind::new(cluster_count);
    for pair in cluster_of.chunks_exact(2) {
        sets.union(pair[0], pair[1]);
    }
    let (component, component_count) = sets.labels();

    let mut sizes = vec![0usize; component_count];
    for &c in &component {
        sizes[c as usize] += 1;
    }
    let largest = sizes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(c, _)| c as u32)
        .unwrap_or(0);

    component.iter().map(|&c| c == largest).collect()
}
