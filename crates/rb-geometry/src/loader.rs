//! Geometry container loading.
//!
//! # Formats
//!
//! | Extension          | Reader                                        |
//! |--------------------|-----------------------------------------------|
//! | `.fgb`             | [`crate::fgb`] (feature = `"fgb"`)            |
//! | `.geojson`, `.json`| [`load_geojson_reader`]                       |
//!
//! Only `LineString` and `MultiLineString` geometries are routable road
//! segments; every other geometry type is skipped with a warning.  A
//! `MultiLineString` contributes one record per part.
//!
//! The file is read once at startup.  There is no write path.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use serde_json::Value;
use tracing::info;

use rb_core::{GeoPoint, LoadError, LoadResult};

use crate::record::{assemble, RawFeature, SegmentRecord};

// ── Container format ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerFormat {
    FlatGeobuf,
    GeoJson,
}

impl ContainerFormat {
    /// Pick the reader from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("fgb") => Ok(Self::FlatGeobuf),
            Some("geojson") | Some("json") => Ok(Self::GeoJson),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Load every usable road segment from the container at `path`.
///
/// # Errors
///
/// - [`LoadError::Io`] if the file cannot be opened.
/// - [`LoadError::UnsupportedFormat`] for unknown extensions (and `.fgb`
///   when the `fgb` feature is off).
/// - [`LoadError::Container`] / [`LoadError::Malformed`] for corrupt or
///   truncated input.
/// - [`LoadError::Empty`] if no usable segment remains.
pub fn load(path: &Path) -> LoadResult<Vec<SegmentRecord>> {
    let started = Instant::now();
    let format = ContainerFormat::from_path(path)?;
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let records = match format {
        #[cfg(feature = "fgb")]
        ContainerFormat::FlatGeobuf => crate::fgb::load_fgb_reader(reader)?,
        #[cfg(not(feature = "fgb"))]
        ContainerFormat::FlatGeobuf => {
            return Err(LoadError::UnsupportedFormat(path.to_path_buf()));
        }
        ContainerFormat::GeoJson => load_geojson_reader(reader)?,
    };

    info!(
        path = %path.display(),
        segments = records.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded road segments",
    );
    Ok(records)
}

/// Parse a GeoJSON `FeatureCollection` (or a single `Feature`).
pub fn load_geojson_reader<R: Read>(reader: R) -> LoadResult<Vec<SegmentRecord>> {
    let value: Value =
        serde_json::from_reader(reader).map_err(|e| LoadError::Malformed(e.to_string()))?;
    geojson_features(&value)
}

/// Like [`load_geojson_reader`] for an in-memory document.
pub fn load_geojson_str(text: &str) -> LoadResult<Vec<SegmentRecord>> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| LoadError::Malformed(e.to_string()))?;
    geojson_features(&value)
}

// ── GeoJSON decoding ──────────────────────────────────────────────────────────

fn geojson_features(doc: &Value) -> LoadResult<Vec<SegmentRecord>> {
    let features: Vec<&Value> = match doc.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => doc
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| LoadError::Malformed("FeatureCollection without a features array".into()))?
            .iter()
            .collect(),
        Some("Feature") => vec![doc],
        other => {
            return Err(LoadError::Malformed(format!(
                "expected a FeatureCollection or Feature, found {other:?}"
            )));
        }
    };

    let raw = features
        .into_iter()
        .enumerate()
        .map(|(index, f)| RawFeature {
            index,
            parts: f.get("geometry").map(line_parts).unwrap_or_default(),
            properties: f
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| {
                    props
                        .iter()
                        .filter_map(|(k, v)| property_text(v).map(|t| (k.clone(), t)))
                        .collect()
                })
                .unwrap_or_else(HashMap::new),
        })
        .collect();

    assemble(raw)
}

/// Polyline parts of a GeoJSON geometry.  Parts with unreadable positions
/// are returned empty so validation rejects them.
fn line_parts(geometry: &Value) -> Vec<Vec<GeoPoint>> {
    let coords = geometry.get("coordinates");
    match (geometry.get("type").and_then(Value::as_str), coords) {
        (Some("LineString"), Some(c)) => vec![parse_line(c)],
        (Some("MultiLineString"), Some(Value::Array(lines))) => {
            lines.iter().map(parse_line).collect()
        }
        _ => Vec::new(),
    }
}

fn parse_line(v: &Value) -> Vec<GeoPoint> {
    let Some(positions) = v.as_array() else {
        return Vec::new();
    };
    let points: Option<Vec<GeoPoint>> = positions.iter().map(parse_position).collect();
    points.unwrap_or_default()
}

/// `[lng, lat, ...]` → `GeoPoint`.  Extra ordinates (altitude) are ignored.
fn parse_position(v: &Value) -> Option<GeoPoint> {
    let arr = v.as_array()?;
    let lon = arr.first()?.as_f64()?;
    let lat = arr.get(1)?.as_f64()?;
    Some(GeoPoint::new(lat, lon))
}

fn property_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
