//! Zoom-dependent level of detail for viewport responses.
//!
//! Below [`FULL_DETAIL_ZOOM`] each polyline is simplified with
//! Visvalingam–Whyatt, using a triangle-area tolerance of roughly one
//! screen pixel at that zoom.  Simplification only removes interior points:
//! both endpoints always survive, so no road ever disappears from a view.

use geo::{Coord, LineString, SimplifyVwIdx};

use rb_core::GeoPoint;

/// Highest zoom level accepted by viewport queries.
pub const MAX_ZOOM: u8 = 24;

/// At and above this zoom full geometry is returned.
pub const FULL_DETAIL_ZOOM: u8 = 14;

/// Web-map tile edge in pixels.
const TILE_PX: f64 = 256.0;

/// Minimum retained triangle area (deg²) for `zoom`, or `None` when the
/// zoom level shows full detail.
pub fn tolerance_for_zoom(zoom: u8) -> Option<f64> {
    if zoom >= FULL_DETAIL_ZOOM {
        return None;
    }
    let pixel_deg = 360.0 / (TILE_PX * f64::from(1u32 << zoom));
    Some(pixel_deg * pixel_deg)
}

/// Simplify `points` to the given area tolerance.  Always keeps the first
/// and last point.
pub fn simplify(points: &[GeoPoint], tolerance: f64) -> Vec<GeoPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.lon, y: p.lat })
        .collect::<Vec<_>>()
        .into();

    let kept = line.simplify_vw_idx(tolerance);
    if kept.len() < 2 {
        return vec![points[0], points[points.len() - 1]];
    }
    kept.into_iter().map(|i| points[i]).collect()
}
