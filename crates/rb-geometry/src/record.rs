//! Typed segment records and the attribute schema they are validated against.
//!
//! Attributes are resolved once, at load time, from the raw property bag of
//! each feature.  Optional fields that are missing, null or blank become
//! `None`; they never cause the record to be dropped.

use std::collections::HashMap;

use tracing::warn;

use rb_core::{polyline_length_m, BBox, GeoPoint, LoadError, LoadResult, SegmentId};

/// Property keys tried, in order, for each attribute.
const CLASSIFICATION_KEYS: &[&str] = &["road_classification_number", "classificationNumber"];
const NAME_KEYS:           &[&str] = &["name_1", "name"];
const LENGTH_KEYS:         &[&str] = &["length", "lengthMeters"];

// ── RoadAttributes ────────────────────────────────────────────────────────────

/// The fixed attribute schema carried by every segment.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadAttributes {
    /// Road number such as `"M25"` or `"A282"`.
    pub classification_number: Option<String>,
    /// Street name (`name_1` in OS Open Roads).
    pub name: Option<String>,
    /// Segment length in metres.  Taken verbatim from the source when it is a
    /// usable number, otherwise the haversine length of the geometry.
    pub length_m: f64,
}

// ── SegmentRecord ─────────────────────────────────────────────────────────────

/// One polyline stretch of road with uniform attributes.
///
/// Immutable after loading.  The owning dataset stores records in a `Vec`
/// where `records[i].id == SegmentId(i)`, so other structures refer to a
/// record by id instead of copying it.
#[derive(Clone, Debug)]
pub struct SegmentRecord {
    pub id:     SegmentId,
    /// At least two finite points.
    pub points: Vec<GeoPoint>,
    pub attrs:  RoadAttributes,
    /// Tight extent of `points`.
    pub bbox:   BBox,
}

impl SegmentRecord {
    /// Validate geometry and build a record.
    ///
    /// Returns `None` when the polyline has fewer than two points or any
    /// point is not a valid WGS-84 coordinate.  When `length_m` is `None`
    /// or unusable, the length is derived from the geometry.
    pub fn new(
        id: SegmentId,
        points: Vec<GeoPoint>,
        classification_number: Option<String>,
        name: Option<String>,
        length_m: Option<f64>,
    ) -> Option<Self> {
        if points.len() < 2 || !points.iter().all(|p| p.is_valid()) {
            return None;
        }
        let bbox = BBox::from_points(&points)?;
        let length_m = length_m
            .filter(|l| l.is_finite() && *l >= 0.0)
            .unwrap_or_else(|| polyline_length_m(&points));
        Some(Self {
            id,
            points,
            attrs: RoadAttributes { classification_number, name, length_m },
            bbox,
        })
    }

    #[inline]
    pub fn start(&self) -> GeoPoint {
        self.points[0]
    }

    #[inline]
    pub fn end(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    /// Identifier reported in route road lists: the classification number,
    /// else the name.  `None` for unnumbered, unnamed segments.
    pub fn road_id(&self) -> Option<&str> {
        self.attrs
            .classification_number
            .as_deref()
            .or(self.attrs.name.as_deref())
    }
}

/// Check that `records[i].id == SegmentId(i)` for every record.
///
/// # Errors
///
/// [`LoadError::SegmentIdMismatch`] naming the first record out of place.
pub fn check_segment_ids(records: &[SegmentRecord]) -> LoadResult<()> {
    match records.iter().enumerate().find(|(i, r)| r.id.index() != *i) {
        Some((position, r)) => Err(LoadError::SegmentIdMismatch { position, found: r.id }),
        None => Ok(()),
    }
}

// ── Raw features ──────────────────────────────────────────────────────────────

/// A decoded feature before validation: one or more polyline parts plus the
/// stringly-typed property bag of the container.
pub(crate) struct RawFeature {
    /// Position of the feature in the source, for diagnostics.
    pub index:      usize,
    pub parts:      Vec<Vec<GeoPoint>>,
    pub properties: HashMap<String, String>,
}

fn lookup<'a>(props: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| props.get(*k))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

/// Validate raw features into sequentially numbered records.
///
/// Unusable geometries (no line parts, fewer than two points, coordinates
/// out of range) are skipped with a warning.
///
/// # Errors
///
/// [`LoadError::Empty`] if no feature yields a usable segment.
pub(crate) fn assemble(features: Vec<RawFeature>) -> LoadResult<Vec<SegmentRecord>> {
    let mut records = Vec::with_capacity(features.len());
    let mut skipped = 0usize;

    for feature in features {
        let classification = lookup(&feature.properties, CLASSIFICATION_KEYS).map(str::to_owned);
        let name = lookup(&feature.properties, NAME_KEYS).map(str::to_owned);
        // A verbatim length describes the whole feature, so it only applies
        // when the feature is a single part.
        let verbatim_len = if feature.parts.len() == 1 {
            lookup(&feature.properties, LENGTH_KEYS).and_then(|s| s.parse::<f64>().ok())
        } else {
            None
        };

        if feature.parts.is_empty() {
            warn!(feature = feature.index, "skipping feature without line geometry");
            skipped += 1;
            continue;
        }

        for part in feature.parts {
            let id = SegmentId::try_from(records.len()).map_err(|_| {
                LoadError::Malformed(format!("more than {} line segments", u32::MAX))
            })?;
            match SegmentRecord::new(id, part, classification.clone(), name.clone(), verbatim_len) {
                Some(rec) => records.push(rec),
                None => {
                    warn!(feature = feature.index, "skipping unusable line geometry");
                    skipped += 1;
                }
            }
        }
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    if skipped > 0 {
        warn!(skipped, kept = records.len(), "some features were not usable");
    }
    Ok(records)
}
