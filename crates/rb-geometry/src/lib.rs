//! `rb-geometry` — road segment loading, viewport indexing and simplification.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`record`]  | `SegmentRecord`, `RoadAttributes` (fixed attribute schema)  |
//! | [`loader`]  | `load` (by extension), GeoJSON reader                       |
//! | [`fgb`]     | FlatGeobuf reader (feature = `"fgb"` only)                  |
//! | [`index`]   | `SpatialIndex` — R-tree over segment bounding boxes         |
//! | [`lod`]     | zoom → simplification tolerance, Visvalingam–Whyatt         |
//! | [`dataset`] | `Dataset` (records + index) and viewport queries            |
//!
//! # Feature flags
//!
//! | Flag  | Effect                                                        |
//! |-------|---------------------------------------------------------------|
//! | `fgb` | Enables FlatGeobuf loading via `flatgeobuf` + `geozero`.      |

pub mod dataset;
pub mod index;
pub mod loader;
pub mod lod;
pub mod record;

#[cfg(feature = "fgb")]
pub mod fgb;


pub use dataset::{Dataset, Viewport, ViewportFeature};
pub use index::SpatialIndex;
pub use loader::{load, load_geojson_reader, load_geojson_str, ContainerFormat};
pub use record::{check_segment_ids, RoadAttributes, SegmentRecord};
