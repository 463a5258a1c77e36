//! `rb-network` — routable road graph, shortest paths and route assembly.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`network`]    | `RoadNetwork` (CSR + node R-tree), `RoadNetworkBuilder`  |
//! | [`snap`]       | endpoint clustering grid, union–find                     |
//! | [`builder`]    | `NetworkBuilder` — segment records → snapped network     |
//! | [`router`]     | `Router` trait, `Path`, `DijkstraRouter`                 |
//! | [`route`]      | `RouteResult`, `RouteAssembler`                          |
//! | [`pathfinder`] | `PathFinder` — coordinates in, `RouteResult` out         |
//! | [`error`]      | `RouteError`                                             |
//!
//! # Lifecycle
//!
//! A network is assembled single-threaded by [`NetworkBuilder`] and is
//! immutable once `build()` returns.  All query types borrow it read-only
//! and allocate their own search state, so one network can serve any number
//! of threads without locking.

pub mod builder;
pub mod error;
pub mod network;
pub mod pathfinder;
pub mod route;
pub mod router;
pub mod snap;

#[cfg(test)]
mod tests;

pub use builder::{NetworkBuilder, DEFAULT_SNAP_TOLERANCE_M};
pub use error::RouteError;
pub use network::{NetworkStats, RoadNetwork, RoadNetworkBuilder};
pub use pathfinder::{PathFinder, DEFAULT_MAX_SNAP_DISTANCE_M};
pub use route::{RouteAssembler, RouteResult};
pub use router::{DijkstraRouter, Path, Router, DEFAULT_MAX_EXPANSIONS};
