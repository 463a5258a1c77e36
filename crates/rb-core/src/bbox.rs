//! Axis-aligned lon/lat rectangles.

use crate::{GeoPoint, QueryError};

/// A `{west, south, east, north}` rectangle in degrees.
///
/// Rectangles never wrap the antimeridian: `west <= east` is required by
/// [`BBox::validated`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub west:  f64,
    pub south: f64,
    pub east:  f64,
    pub north: f64,
}

impl BBox {
    /// The whole WGS-84 range.
    pub const WORLD: BBox = BBox { west: -180.0, south: -90.0, east: 180.0, north: 90.0 };

    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    /// Tight bounding box of `points`, or `None` if `points` is empty.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut b = BBox::new(first.lon, first.lat, first.lon, first.lat);
        for p in &points[1..] {
            b.west  = b.west.min(p.lon);
            b.east  = b.east.max(p.lon);
            b.south = b.south.min(p.lat);
            b.north = b.north.max(p.lat);
        }
        Some(b)
    }

    /// Check a caller-supplied viewport.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidBbox`] if any edge is non-finite, outside the
    /// WGS-84 range, or the rectangle is inverted.
    pub fn validated(self) -> Result<Self, QueryError> {
        let finite = [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite());
        let in_range = (-180.0..=180.0).contains(&self.west)
            && (-180.0..=180.0).contains(&self.east)
            && (-90.0..=90.0).contains(&self.south)
            && (-90.0..=90.0).contains(&self.north);
        if !finite || !in_range || self.west > self.east || self.south > self.north {
            return Err(QueryError::InvalidBbox(self.to_string()));
        }
        Ok(self)
    }

    /// Closed-interval overlap test (touching edges intersect).
    #[inline]
    pub fn intersects(&self, other: &BBox) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.west..=self.east).contains(&p.lon) && (self.south..=self.north).contains(&p.lat)
    }

    #[inline]
    pub fn min_corner(&self) -> [f64; 2] {
        [self.west, self.south]
    }

    #[inline]
    pub fn max_corner(&self) -> [f64; 2] {
        [self.east, self.north]
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.west, self.south, self.east, self.north)
    }
}
