//! The immutable RoadBox service object.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use rb_core::{BBox, GeoPoint, LoadError, LoadResult, QueryError, QueryResult};
use rb_geometry::{Dataset, SegmentRecord, SpatialIndex};
use rb_network::{NetworkBuilder, PathFinder, RoadNetwork, RouteResult};

use crate::config::ServiceConfig;
use crate::dto::{
    DatasetHealth, FeatureCollection, HealthReport, NetworkHealth, RouteOutcome, RouteRequest,
    ViewportRequest,
};
use crate::error::ServiceResult;

/// Loaded datasets, the routing network and the query limits, bundled into
/// one value that is built once and then only read.
pub struct RoadService {
    datasets:     Vec<Dataset>,
    /// Index into `datasets` of the routing dataset.
    routing:      usize,
    network:      RoadNetwork,
    finder:       PathFinder,
    max_features: usize,
    default_zoom: u8,
}

impl RoadService {
    /// Load every configured dataset and build the network.
    ///
    /// Datasets are read in parallel.  Any error aborts the whole load.
    pub fn load(config: &ServiceConfig) -> LoadResult<Self> {
        config.validate()?;
        let started = Instant::now();

        let loaded = config
            .datasets
            .par_iter()
            .map(|(name, path)| {
                rb_geometry::load(path).map(|records| (name.clone(), records))
            })
            .collect::<LoadResult<Vec<_>>>()?;

        let service = Self::from_records(config, loaded)?;
        info!(
            datasets = service.datasets.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "road service ready",
        );
        Ok(service)
    }

    /// Build the service from already loaded records, one entry per
    /// configured dataset.
    ///
    /// The routing dataset's viewport index and road network are built in
    /// parallel; both only read the records.
    pub fn from_records(
        config: &ServiceConfig,
        loaded: Vec<(String, Vec<SegmentRecord>)>,
    ) -> LoadResult<Self> {
        let routing = loaded
            .iter()
            .position(|(name, _)| *name == config.routing_dataset)
            .ok_or_else(|| LoadError::UnknownRoutingDataset(config.routing_dataset.clone()))?;

        let builder = NetworkBuilder::new(config.snap_tolerance_m)
            .keep_largest_component(config.keep_largest_component);

        let mut network = None;
        let mut datasets = Vec::with_capacity(loaded.len());
        for (i, (name, records)) in loaded.into_iter().enumerate() {
            if i == routing {
                let (index, built) =
                    rayon::join(|| SpatialIndex::build(&records), || builder.build(&records));
                network = Some(built?);
                datasets.push(Dataset::from_parts(name, records, index)?);
            } else {
                datasets.push(Dataset::new(name, records)?);
            }
        }
        let network = network.ok_or_else(|| LoadError::UnknownRoutingDataset(config.routing_dataset.clone()))?;

        for d in &datasets {
            info!(dataset = d.name(), features = d.len(), "dataset indexed");
        }

        Ok(Self {
            datasets,
            routing,
            network,
            finder: PathFinder::new(config.max_snap_distance_m, config.max_expansions),
            max_features: config.max_features,
            default_zoom: config.default_zoom,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn routing_dataset(&self) -> &Dataset {
        &self.datasets[self.routing]
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name() == name)
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    // ── Route queries ─────────────────────────────────────────────────────

    /// Shortest route between two coordinates over the routing dataset.
    pub fn route(&self, start: GeoPoint, end: GeoPoint) -> ServiceResult<RouteResult> {
        let started = Instant::now();
        let result = self
            .finder
            .find_route(&self.network, self.routing_dataset().records(), start, end);
        match &result {
            Ok(r) => debug!(
                %start, %end,
                distance_m = r.distance_m,
                nodes = r.node_count,
                elapsed_us = started.elapsed().as_micros() as u64,
                "route query",
            ),
            Err(e) => debug!(%start, %end, error = %e, "route query failed"),
        }
        Ok(result?)
    }

    /// [`route`](Self::route) in wire form.
    pub fn route_query(&self, req: &RouteRequest) -> RouteOutcome {
        self.route(req.start.into(), req.end.into()).into()
    }

    /// Answer several route queries in parallel, results in input order.
    pub fn route_many(&self, reqs: &[RouteRequest]) -> Vec<RouteOutcome> {
        reqs.par_iter().map(|r| self.route_query(r)).collect()
    }

    // ── Viewport queries ──────────────────────────────────────────────────

    /// Features of `dataset` (default: the routing dataset) intersecting
    /// `bbox`, simplified for `zoom` (default: the configured zoom).
    ///
    /// # Errors
    ///
    /// [`QueryError::UnknownDataset`], [`QueryError::InvalidZoom`] or
    /// [`QueryError::InvalidBbox`].
    pub fn viewport(
        &self,
        dataset: Option<&str>,
        bbox: BBox,
        zoom: Option<i64>,
    ) -> QueryResult<FeatureCollection> {
        let data = match dataset {
            Some(name) => self
                .dataset(name)
                .ok_or_else(|| QueryError::UnknownDataset(name.to_string()))?,
            None => self.routing_dataset(),
        };
        let zoom = match zoom {
            Some(z) => u8::try_from(z).map_err(|_| QueryError::InvalidZoom(z))?,
            None => self.default_zoom,
        };
        let view = data.viewport(bbox, zoom, self.max_features)?;
        Ok(FeatureCollection::from(&view))
    }

    /// [`viewport`](Self::viewport) for a deserialized request.
    pub fn viewport_query(&self, req: &ViewportRequest) -> QueryResult<FeatureCollection> {
        self.viewport(req.dataset.as_deref(), req.bbox.unwrap_or(BBox::WORLD), req.zoom)
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub fn health(&self) -> HealthReport {
        let stats = self.network.stats();
        HealthReport {
            status: "healthy",
            datasets: self
                .datasets
                .iter()
                .map(|d| DatasetHealth { name: d.name().to_string(), features: d.len() })
                .collect(),
            network: NetworkHealth {
                dataset:    self.routing_dataset().name().to_string(),
                nodes:      stats.nodes,
                edges:      stats.edges,
                components: stats.components,
            },
        }
    }
}
