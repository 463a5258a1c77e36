//! Viewport spatial index.
//!
//! An R-tree (via `rstar`) over each segment's bounding box, in `[lon, lat]`
//! axis order.  Built once with a bulk load; read-only afterwards.
//!
//! Queries test bounding-box overlap only, so a segment whose box touches
//! the viewport while its line does not is returned too.  Display is the
//! only consumer, so such false positives are harmless.  There are no false
//! negatives.

use rstar::{RTree, RTreeObject, AABB};

use rb_core::{BBox, SegmentId};

use crate::record::SegmentRecord;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct SegmentEntry {
    envelope: AABB<[f64; 2]>,
    id:       SegmentId,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn aabb(b: &BBox) -> AABB<[f64; 2]> {
    AABB::from_corners(b.min_corner(), b.max_corner())
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Bounding-box tree over the segments of one dataset.
pub struct SpatialIndex {
    tree: RTree<SegmentEntry>,
}

impl SpatialIndex {
    /// Bulk-load the index.  O(n log n).
    pub fn build(records: &[SegmentRecord]) -> Self {
        let entries: Vec<SegmentEntry> = records
            .iter()
            .map(|r| SegmentEntry { envelope: aabb(&r.bbox), id: r.id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    /// Ids of all segments whose bounding box intersects `bbox`, ascending.
    ///
    /// Cost is O(log n + k) for the tree walk plus O(k log k) to return the
    /// ids in a stable order.
    pub fn query(&self, bbox: &BBox) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self
            .tree
            .locate_in_envelope_intersecting(&aabb(bbox))
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
