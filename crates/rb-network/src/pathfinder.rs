//! Coordinate-to-coordinate routing on top of a [`Router`].

use tracing::debug;

use rb_core::{GeoPoint, NodeId, QueryError};
use rb_geometry::SegmentRecord;

use crate::network::RoadNetwork;
use crate::route::{RouteAssembler, RouteResult};
use crate::router::{DijkstraRouter, Router};
use crate::RouteError;

/// Default maximum distance from a query point to its nearest node, metres.
pub const DEFAULT_MAX_SNAP_DISTANCE_M: f64 = 50_000.0;

/// Answers `find_route(start, end)` queries.
///
/// Stateless apart from its limits: every call projects both points onto
/// the nearest node, checks that they share a component, runs the router
/// and assembles the result.  Safe to share across threads.
#[derive(Clone, Debug)]
pub struct PathFinder<R: Router = DijkstraRouter> {
    /// Inclusive upper bound on projection distance.
    pub max_snap_distance_m: f64,
    router: R,
}

impl PathFinder<DijkstraRouter> {
    pub fn new(max_snap_distance_m: f64, max_expansions: usize) -> Self {
        Self { max_snap_distance_m, router: DijkstraRouter::new(max_expansions) }
    }
}

impl Default for PathFinder<DijkstraRouter> {
    fn default() -> Self {
        Self { max_snap_distance_m: DEFAULT_MAX_SNAP_DISTANCE_M, router: DijkstraRouter::default() }
    }
}

impl<R: Router> PathFinder<R> {
    pub fn with_router(max_snap_distance_m: f64, router: R) -> Self {
        Self { max_snap_distance_m, router }
    }

    /// Nearest node to `point` and its distance in metres.
    ///
    /// # Errors
    ///
    /// - [`QueryError::NonFiniteCoordinate`] / [`QueryError::InvalidLatLng`]
    ///   for unusable input.
    /// - [`RouteError::OutOfRange`] if no node lies within
    ///   `max_snap_distance_m`.
    pub fn project(&self, network: &RoadNetwork, point: GeoPoint) -> Result<(NodeId, f64), RouteError> {
        if !point.is_finite() {
            return Err(QueryError::NonFiniteCoordinate.into());
        }
        if !point.is_valid() {
            return Err(QueryError::InvalidLatLng(point.to_string()).into());
        }
        network
            .nearest_node(point, self.max_snap_distance_m)
            .ok_or(RouteError::OutOfRange { point, max_distance_m: self.max_snap_distance_m })
    }

    /// Shortest route between two arbitrary coordinates.
    ///
    /// `records` must be the segment list the network was built from.
    pub fn find_route(
        &self,
        network: &RoadNetwork,
        records: &[SegmentRecord],
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<RouteResult, RouteError> {
        let (from, from_d) = self.project(network, start)?;
        let (to, to_d) = self.project(network, end)?;
        debug!(%from, from_d, %to, to_d, "query points projected");

        if !network.same_component(from, to) {
            return Err(RouteError::NotConnected { from, to });
        }

        let path = self.router.route(network, from, to)?;
        Ok(RouteAssembler::new(network, records).assemble(&path, start, end))
    }
}
