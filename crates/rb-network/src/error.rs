//! Per-query routing errors.

use thiserror::Error;

use rb_core::{GeoPoint, NodeId, QueryError};

/// Errors produced while answering a route query.  None of them is fatal to
/// the shared network.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("no road within {max_distance_m} m of {point}")]
    OutOfRange { point: GeoPoint, max_distance_m: f64 },

    #[error("no route from {from} to {to}: different connected components")]
    NotConnected { from: NodeId, to: NodeId },

    #[error(transparent)]
    Query(#[from] QueryError),
}
