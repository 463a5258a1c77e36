//! `rb-core` — foundational types for the RoadBox road network service.
//!
//! Every other `rb-*` crate depends on this one.  It has no `rb-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`ids`]   | `NodeId`, `EdgeId`, `SegmentId`                           |
//! | [`geo`]   | `GeoPoint`, haversine distance, polyline length           |
//! | [`bbox`]  | `BBox` (west/south/east/north) and its validation         |
//! | [`error`] | `LoadError`, `QueryError`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod bbox;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bbox::BBox;
pub use error::{LoadError, LoadResult, QueryError, QueryResult};
pub use geo::{polyline_length_m, GeoPoint, EARTH_RADIUS_M, METERS_PER_DEGREE};
pub use ids::{EdgeId, NodeId, SegmentId};
