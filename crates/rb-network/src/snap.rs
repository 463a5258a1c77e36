//! Endpoint snapping.
//!
//! Independently digitised segments often miss each other by a metre or two
//! at junctions.  [`cluster_endpoints`] unifies every pair of points closer
//! than the snap tolerance, transitively, so no gap within tolerance survives
//! the build.
//!
//! Points are bucketed in a grid whose cells are at least one tolerance wide
//! in both axes, so candidate neighbours of a point are confined to its own
//! cell and the eight around it.  With bounded junction density this is
//! O(n) amortised.

use rustc_hash::FxHashMap;

use rb_core::{GeoPoint, EARTH_RADIUS_M, METERS_PER_DEGREE};

/// Smallest grid cell, in degrees, used when the tolerance is zero.
const MIN_CELL_DEG: f64 = 1e-7;

const CELL_SLACK: f64 = 1.0 + 1e-6;

// ── UnionFind ─────────────────────────────────────────────────────────────────

/// Disjoint sets over `0..n`.  The root of a set is always its smallest
/// member, which keeps cluster numbering independent of merge order.
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self { parent: (0..n as u32).collect() }
    }

    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    pub fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
    }

    /// Dense set labels `0..k` in order of each set's first member, plus `k`.
    pub fn labels(&mut self) -> (Vec<u32>, usize) {
        let n = self.parent.len();
        let mut label_of_root = vec![u32::MAX; n];
        let mut labels = Vec::with_capacity(n);
        let mut next = 0u32;
        for i in 0..n as u32 {
            let root = self.find(i) as usize;
            if label_of_root[root] == u32::MAX {
                label_of_root[root] = next;
                next += 1;
            }
            labels.push(label_of_root[root]);
        }
        (labels, next as usize)
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// Cell sizes (lat, lon) in degrees such that two points within
/// `tolerance_m` of each other, both at |lat| <= `max_abs_lat`, are at most
/// one cell apart on each axis.
fn cell_size_deg(tolerance_m: f64, max_abs_lat: f64) -> (f64, f64) {
    let lat = tolerance_m / METERS_PER_DEGREE;
    // Haversine gives d >= 2R·cos(φmax)·sin(Δλ/2), so Δλ <= 2·asin(d / (2R·cos φmax)).
    let cos = max_abs_lat.to_radians().cos();
    let lon = if cos <= 0.0 {
        360.0
    } else {
        let s = tolerance_m / (2.0 * EARTH_RADIUS_M * cos);
        if s >= 1.0 { 360.0 } else { (2.0 * s.asin()).to_degrees() }
    };
    // Widen slightly so rounding never pushes a pair two cells apart.
    (lat.max(MIN_CELL_DEG) * CELL_SLACK, lon.max(MIN_CELL_DEG) * CELL_SLACK)
}

#[inline]
fn cell_of(p: GeoPoint, cell: (f64, f64)) -> (i64, i64) {
    ((p.lat / cell.0).floor() as i64, (p.lon / cell.1).floor() as i64)
}

/// Group `points` into clusters of mutually reachable points, where two
/// points are linked when their haversine distance is `<= tolerance_m`.
///
/// Returns the cluster label of each point (dense, numbered in order of
/// first appearance) and the number of clusters.
pub fn cluster_endpoints(points: &[GeoPoint], tolerance_m: f64) -> (Vec<u32>, usize) {
    let tolerance_m = tolerance_m.max(0.0);
    let max_abs_lat = points.iter().fold(0.0f64, |m, p| m.max(p.lat.abs()));
    let cell = cell_size_deg(tolerance_m, max_abs_lat);

    let mut grid: FxHashMap<(i64, i64), Vec<u32>> = FxHashMap::default();
    let mut sets = UnionFind::new(points.len());

    for (i, &p) in points.iter().enumerate() {
        let (cy, cx) = cell_of(p, cell);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(bucket) = grid.get(&(cy + dy, cx + dx)) else {
                    continue;
                };
                for &j in bucket {
                    if p.distance_m(points[j as usize]) <= tolerance_m {
                        sets.union(i as u32, j);
                    }
                }
            }
        }
        grid.entry((cy, cx)).or_default().push(i as u32);
    }

    sets.labels()
}
