//! Road network representation and CSR assembly.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_*[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Edge arrays are sorted by source node with a *stable* sort, so the
//! outgoing edges of a node keep the order in which they were added.  That
//! order is what makes Dijkstra's tie-breaking reproducible.
//!
//! Every road segment contributes two directed edges with identical weight:
//! one following the segment's point order (`edge_forward == true`) and one
//! against it.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over node positions in `[lon, lat]` order, used to
//! project query coordinates onto the nearest node.

use std::fmt;

use rstar::{RTree, RTreeObject, AABB};

use rb_core::{EdgeId, GeoPoint, NodeId, SegmentId, EARTH_RADIUS_M, METERS_PER_DEGREE};

use crate::snap::UnionFind;

/// Slack added to the candidate envelope so rounding in the degree
/// conversion never excludes a node at exactly the maximum distance.
const ENVELOPE_PAD_DEG: f64 = 1e-9;

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lon, lat]
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ── NetworkStats ──────────────────────────────────────────────────────────────

/// Size summary reported by health checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NetworkStats {
    pub nodes:      usize,
    /// Directed edges (twice the number of segments).
    pub edges:      usize,
    pub components: usize,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Undirected road graph stored as directed CSR edges, plus a node index.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`] or
/// [`crate::NetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Connected-component label of each node, `0..component_count`.
    pub node_component: Vec<u32>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    /// Source node of each edge, used to walk predecessor chains.
    pub edge_from: Vec<NodeId>,

    pub edge_to: Vec<NodeId>,

    /// Edge weight in metres (the segment's `length_m`).
    pub edge_length_m: Vec<f64>,

    /// Weight in whole millimetres.  Dijkstra's priority key; integer sums
    /// keep equal-cost comparisons exact.
    pub edge_cost_mm: Vec<u64>,

    /// Segment whose geometry this edge traverses.
    pub edge_segment: Vec<SegmentId>,

    /// `true` if the edge runs in the segment's stored point order.
    pub edge_forward: Vec<bool>,

    component_count: usize,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// A network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    pub fn component_count(&self) -> usize {
        self.component_count
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            nodes:      self.node_count(),
            edges:      self.edge_count(),
            components: self.component_count,
        }
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`, in
    /// insertion order.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    #[inline]
    pub fn component_of(&self, node: NodeId) -> u32 {
        self.node_component[node.index()]
    }

    #[inline]
    pub fn same_component(&self, a: NodeId, b: NodeId) -> bool {
        self.component_of(a) == self.component_of(b)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest node to `pos` with its haversine distance, considering only
    /// nodes at most `max_distance_m` away (inclusive).
    ///
    /// Ties go to the lower `NodeId`.  Longitudes are not wrapped across the
    /// antimeridian.
    pub fn nearest_node(&self, pos: GeoPoint, max_distance_m: f64) -> Option<(NodeId, f64)> {
        if max_distance_m.is_nan() || max_distance_m < 0.0 {
            return None;
        }
        let d_lat = max_distance_m / METERS_PER_DEGREE + ENVELOPE_PAD_DEG;
        let lat_lo = (pos.lat - d_lat).max(-90.0);
        let lat_hi = (pos.lat + d_lat).min(90.0);

        // Same lower bound as the snapping grid: d >= 2R·cos(φmax)·sin(Δλ/2).
        let cos = lat_lo.abs().max(lat_hi.abs()).to_radians().cos();
        let s = if cos > 0.0 { max_distance_m / (2.0 * EARTH_RADIUS_M * cos) } else { 1.0 };
        let d_lon = if s >= 1.0 { 360.0 } else { (2.0 * s.asin()).to_degrees() + ENVELOPE_PAD_DEG };

        let envelope = AABB::from_corners([pos.lon - d_lon, lat_lo], [pos.lon + d_lon, lat_hi]);

        let mut best: Option<(NodeId, f64)> = None;
        for entry in self.spatial_idx.locate_in_envelope(&envelope) {
            let d = pos.distance_m(self.node_pos[entry.id.index()]);
            if d > max_distance_m {
                continue;
            }
            best = match best {
                Some((id, bd)) if bd < d || (bd == d && id < entry.id) => Some((id, bd)),
                _ => Some((entry.id, d)),
            };
        }
        best
    }
}

impl fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("components", &self.component_count)
            .finish()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Assemble a [`RoadNetwork`] from explicit nodes and edges, then call
/// [`build`](Self::build).
///
/// This is the low-level CSR assembler.  Most callers want
/// [`crate::NetworkBuilder`], which derives nodes from segment endpoints.
///
/// # Example
///
/// ```
/// use rb_core::{GeoPoint, SegmentId};
/// use rb_network::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(51.40, 0.10));
/// let c = b.add_node(GeoPoint::new(51.45, 0.20));
/// b.add_road(a, c, 8_500.0, SegmentId(0));
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
    segment:  SegmentId,
    forward:  bool,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a single **directed** edge.
    pub fn add_directed_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        length_m: f64,
        segment: SegmentId,
        forward: bool,
    ) {
        self.raw_edges.push(RawEdge { from, to, length_m, segment, forward });
    }

    /// Add both directions of `segment`, which runs from `a` to `b` in its
    /// stored point order.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64, segment: SegmentId) {
        self.add_directed_edge(a, b, length_m, segment, true);
        self.add_directed_edge(b, a, length_m, segment, false);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce an immutable [`RoadNetwork`].
    ///
    /// O(E log E) for the edge sort, O(E α(N)) for component labelling and
    /// O(N log N) for the R-tree bulk load.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:     Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>       = raw.iter().map(|e| e.length_m).collect();
        let edge_cost_mm:  Vec<u64>       = raw.iter().map(|e| to_millimetres(e.length_m)).collect();
        let edge_segment:  Vec<SegmentId> = raw.iter().map(|e| e.segment).collect();
        let edge_forward:  Vec<bool>      = raw.iter().map(|e| e.forward).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut sets = UnionFind::new(node_count);
        for e in &raw {
            sets.union(e.from.0, e.to.0);
        }
        let (node_component, component_count) = sets.labels();

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, pos)| NodeEntry { point: pos.lon_lat(), id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadNetwork {
            node_pos: self.nodes,
            node_component,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_cost_mm,
            edge_segment,
            edge_forward,
            component_count,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn to_millimetres(length_m: f64) -> u64 {
    (length_m.max(0.0) * 1_000.0).round() as u64
}
