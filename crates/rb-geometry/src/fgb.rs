//! FlatGeobuf loader — enabled with the `fgb` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::{fs::File, io::BufReader};
//! use rb_geometry::fgb::load_fgb_reader;
//!
//! let records = load_fgb_reader(BufReader::new(File::open("motorways.fgb")?))?;
//! ```
//!
//! Features are streamed in file order.  Property values arrive as strings
//! from `geozero`'s property bag and are typed by the record schema.  A
//! decoding failure part-way through (e.g. a truncated file) fails the whole
//! load: a partially loaded network is never served.

use std::fmt::Display;
use std::io::{Read, Seek};

use flatgeobuf::{FallibleStreamingIterator, FgbReader};
use geo::{Geometry, LineString};
use geozero::{FeatureProperties, ToGeo};
use tracing::{debug, warn};

use rb_core::{GeoPoint, LoadError, LoadResult};

use crate::record::{assemble, RawFeature, SegmentRecord};

fn container_err(e: impl Display) -> LoadError {
    LoadError::Container(e.to_string())
}

/// Read every feature of a FlatGeobuf stream into validated records.
///
/// # Errors
///
/// [`LoadError::Container`] on bad magic bytes, header or feature decoding
/// errors; [`LoadError::Empty`] if no usable line segment is found.
pub fn load_fgb_reader<R: Read + Seek>(reader: R) -> LoadResult<Vec<SegmentRecord>> {
    let mut features = FgbReader::open(reader)
        .map_err(container_err)?
        .select_all()
        .map_err(container_err)?;

    let mut raw = Vec::new();
    while let Some(feature) = features.next().map_err(container_err)? {
        let index = raw.len();
        let properties = feature.properties().map_err(container_err)?;
        let parts = match feature.to_geo() {
            Ok(geometry) => line_parts(geometry),
            Err(e) => {
                warn!(feature = index, error = %e, "feature geometry could not be decoded");
                Vec::new()
            }
        };
        raw.push(RawFeature { index, parts, properties });
    }
    debug!(features = raw.len(), "decoded FlatGeobuf features");

    assemble(raw)
}

fn line_parts(geometry: Geometry<f64>) -> Vec<Vec<GeoPoint>> {
    match geometry {
        Geometry::LineString(line) => vec![to_points(&line)],
        Geometry::MultiLineString(lines) => lines.0.iter().map(to_points).collect(),
        _ => Vec::new(),
    }
}

fn to_points(line: &LineString<f64>) -> Vec<GeoPoint> {
    line.coords().map(|c| GeoPoint::new(c.y, c.x)).collect()
}
