//! Error types shared by the `rb-*` crates.
//!
//! Startup failures are [`LoadError`]s and abort initialisation; malformed
//! per-request input is a [`QueryError`] and only fails that request.

use std::path::PathBuf;

use thiserror::Error;

use crate::SegmentId;

/// Fatal startup errors: the geometry source or the graph built from it is
/// unusable, so the service must not start.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported geometry container {0:?} (expected .fgb, .geojson or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("container decode error: {0}")]
    Container(String),

    #[error("malformed geometry source: {0}")]
    Malformed(String),

    #[error("geometry source contains no usable line segments")]
    Empty,

    #[error("segment at position {position} carries id {found}; ids must equal positions")]
    SegmentIdMismatch { position: usize, found: SegmentId },

    #[error("network has {0} distinct endpoint(s); at least 2 are required")]
    TooFewNodes(usize),

    #[error("routing dataset {0:?} is not among the configured datasets")]
    UnknownRoutingDataset(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Per-request input or budget errors.  Never fatal to the service.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("coordinate is not a finite number")]
    NonFiniteCoordinate,

    #[error("coordinate {0} is outside the WGS-84 range")]
    InvalidLatLng(String),

    #[error("invalid bounding box {0}")]
    InvalidBbox(String),

    #[error("invalid zoom level {0}")]
    InvalidZoom(i64),

    #[error("unknown dataset {0:?}")]
    UnknownDataset(String),

    #[error("search budget exhausted after {expansions} node expansions")]
    BudgetExceeded { expansions: usize },
}

pub type QueryResult<T> = Result<T, QueryError>;
