//! A named, immutable dataset: its segment records plus their viewport index.

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use rb_core::{BBox, GeoPoint, LoadError, LoadResult, QueryError, QueryResult};

use crate::index::SpatialIndex;
use crate::lod::{self, MAX_ZOOM};
use crate::record::{check_segment_ids, SegmentRecord};

/// Records and index, built once and shared read-only.
pub struct Dataset {
    name:    String,
    records: Vec<SegmentRecord>,
    index:   SpatialIndex,
}

/// One viewport feature: the source record and the (possibly simplified)
/// geometry to draw.
pub struct ViewportFeature<'a> {
    pub record: &'a SegmentRecord,
    pub points: Cow<'a, [GeoPoint]>,
}

/// Result of [`Dataset::viewport`].
pub struct Viewport<'a> {
    /// Ascending segment-id order.
    pub features:  Vec<ViewportFeature<'a>>,
    /// `true` when more segments matched than `max_features`.
    pub truncated: bool,
}

impl Dataset {
    /// Index `records` and wrap them under `name`.
    ///
    /// # Errors
    ///
    /// [`LoadError::SegmentIdMismatch`] unless `records[i].id == SegmentId(i)`.
    pub fn new(name: impl Into<String>, records: Vec<SegmentRecord>) -> LoadResult<Self> {
        check_segment_ids(&records)?;
        let index = SpatialIndex::build(&records);
        Ok(Self { name: name.into(), records, index })
    }

    /// Wrap records with an index that was built separately (e.g. in
    /// parallel with the road network).  The index must have been built
    /// from these records.
    pub fn from_parts(
        name: impl Into<String>,
        records: Vec<SegmentRecord>,
        index: SpatialIndex,
    ) -> LoadResult<Self> {
        check_segment_ids(&records)?;
        if index.len() != records.len() {
            return Err(LoadError::Malformed(format!(
                "index holds {} segments but the dataset has {}",
                index.len(),
                records.len()
            )));
        }
        Ok(Self { name: name.into(), records, index })
    }

    /// Load `path` with [`crate::load`] and index it.
    pub fn load(name: impl Into<String>, path: &Path) -> LoadResult<Self> {
        Self::new(name, crate::load(path)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[SegmentRecord] {
        &self.records
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Segments intersecting `bbox`, simplified for `zoom`, capped at
    /// `max_features`.
    ///
    /// A viewport that misses all geometry yields an empty feature list.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidBbox`] or [`QueryError::InvalidZoom`] for bad
    /// input.
    pub fn viewport(&self, bbox: BBox, zoom: u8, max_features: usize) -> QueryResult<Viewport<'_>> {
        let bbox = bbox.validated()?;
        if zoom > MAX_ZOOM {
            return Err(QueryError::InvalidZoom(i64::from(zoom)));
        }

        let mut ids = self.index.query(&bbox);
        let truncated = ids.len() > max_features;
        ids.truncate(max_features);

        let tolerance = lod::tolerance_for_zoom(zoom);
        let features = ids
            .into_iter()
            .map(|id| {
                let record = &self.records[id.index()];
                let points = match tolerance {
                    Some(t) => Cow::Owned(lod::simplify(&record.points, t)),
                    None => Cow::Borrowed(record.points.as_slice()),
                };
                ViewportFeature { record, points }
            })
            .collect::<Vec<_>>();

        debug!(dataset = %self.name, %bbox, zoom, features = features.len(), truncated, "viewport query");
        Ok(Viewport { features, truncated })
    }
}
