//! Transport-independent request and response shapes.
//!
//! Coordinates on the wire are `[lng, lat]` pairs, as in GeoJSON.  Field
//! names are camelCase.

use serde::{Deserialize, Serialize};

use rb_core::{BBox, GeoPoint};
use rb_geometry::{Viewport, ViewportFeature};
use rb_network::RouteResult;

use crate::error::{ErrorKind, ServiceError};

// ── Route ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for GeoPoint {
    fn from(p: LatLng) -> Self {
        GeoPoint::new(p.lat, p.lng)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: LatLng,
    pub end:   LatLng,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub coordinates:     Vec<[f64; 2]>,
    pub distance_meters: f64,
    pub roads:           Vec<String>,
    /// Graph nodes on the path.
    pub nodes:           usize,
}

impl From<&RouteResult> for RouteResponse {
    fn from(r: &RouteResult) -> Self {
        Self {
            coordinates:     r.coordinates.iter().map(|p| p.lon_lat()).collect(),
            distance_meters: r.distance_m,
            roads:           r.roads.clone(),
            nodes:           r.node_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error:   ErrorKind,
    pub message: String,
}

impl From<&ServiceError> for ErrorResponse {
    fn from(e: &ServiceError) -> Self {
        Self { error: e.kind(), message: e.to_string() }
    }
}

/// `RouteResponse | { error, message }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteOutcome {
    Route(RouteResponse),
    Error(ErrorResponse),
}

impl RouteOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, RouteOutcome::Route(_))
    }
}

impl From<Result<RouteResult, ServiceError>> for RouteOutcome {
    fn from(r: Result<RouteResult, ServiceError>) -> Self {
        match r {
            Ok(route) => RouteOutcome::Route(RouteResponse::from(&route)),
            Err(e) => RouteOutcome::Error(ErrorResponse::from(&e)),
        }
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportRequest {
    /// Defaults to the whole dataset, still capped at `max_features`.
    #[serde(default)]
    pub bbox:    Option<BBox>,
    /// Defaults to the service's configured zoom.
    #[serde(default)]
    pub zoom:    Option<i64>,
    /// Defaults to the routing dataset.
    #[serde(default)]
    pub dataset: Option<String>,
}

/// A GeoJSON `FeatureCollection` of road segments.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind:      &'static str,
    pub features:  Vec<Feature>,
    /// `true` when the feature cap cut the result short.
    pub truncated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind:       &'static str,
    pub geometry:   LineString,
    pub properties: FeatureProperties,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind:        &'static str,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    pub classification_number: Option<String>,
    pub name:                  Option<String>,
    pub length_meters:         f64,
}

impl From<&ViewportFeature<'_>> for Feature {
    fn from(f: &ViewportFeature<'_>) -> Self {
        let attrs = &f.record.attrs;
        Self {
            kind: "Feature",
            geometry: LineString {
                kind:        "LineString",
                coordinates: f.points.iter().map(|p| p.lon_lat()).collect(),
            },
            properties: FeatureProperties {
                classification_number: attrs.classification_number.clone(),
                name:                  attrs.name.clone(),
                length_meters:         attrs.length_m,
            },
        }
    }
}

impl From<&Viewport<'_>> for FeatureCollection {
    fn from(v: &Viewport<'_>) -> Self {
        Self {
            kind:      "FeatureCollection",
            features:  v.features.iter().map(Feature::from).collect(),
            truncated: v.truncated,
        }
    }
}

// ── Health ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthReport {
    pub status:   &'static str,
    pub datasets: Vec<DatasetHealth>,
    pub network:  NetworkHealth,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetHealth {
    pub name:     String,
    pub features: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetworkHealth {
    pub dataset:    String,
    pub nodes:      usize,
    pub edges:      usize,
    pub components: usize,
}
