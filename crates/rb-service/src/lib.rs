//! `rb-service` — the immutable RoadBox query service.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`config`]  | `ServiceConfig` (defaults, environment overrides)         |
//! | [`service`] | `RoadService` — datasets, network, route/viewport queries |
//! | [`dto`]     | wire types: route request/response, GeoJSON output        |
//! | [`error`]   | `ServiceError`, wire `ErrorKind`                          |
//!
//! # Lifecycle
//!
//! [`RoadService::load`] reads every configured dataset, indexes it and
//! builds the road network from the routing dataset.  Any failure aborts
//! startup.  The finished service is immutable and `Sync`, so request
//! handlers share it through a plain reference or an `Arc`.

pub mod config;
pub mod dto;
pub mod error;
pub mod service;


pub use config::ServiceConfig;
pub use dto::{
    DatasetHealth, ErrorResponse, FeatureCollection, HealthReport, LatLng, NetworkHealth,
    RouteOutcome, RouteRequest, RouteResponse, ViewportRequest,
};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use service::RoadService;
