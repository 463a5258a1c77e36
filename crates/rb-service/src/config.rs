//! Service configuration: defaults plus environment overrides.

use std::env;
use std::path::PathBuf;

use rb_core::{LoadError, LoadResult};
use rb_network::{DEFAULT_MAX_EXPANSIONS, DEFAULT_MAX_SNAP_DISTANCE_M, DEFAULT_SNAP_TOLERANCE_M};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Display datasets as `(name, path)`, in configuration order.
    pub datasets: Vec<(String, PathBuf)>,
    /// Dataset the road network is built from.
    pub routing_dataset: String,
    pub snap_tolerance_m: f64,
    pub max_snap_distance_m: f64,
    pub max_expansions: usize,
    pub max_features: usize,
    pub keep_largest_component: bool,
    /// Zoom used by viewport queries that do not give one.
    pub default_zoom: u8,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            datasets: vec![("motorways".to_string(), PathBuf::from("data/motorways.fgb"))],
            routing_dataset: "motorways".to_string(),
            snap_tolerance_m: DEFAULT_SNAP_TOLERANCE_M,
            max_snap_distance_m: DEFAULT_MAX_SNAP_DISTANCE_M,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            max_features: 10_000,
            keep_largest_component: false,
            default_zoom: 6,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `ROADBOX_*` environment variables.
    ///
    /// # Errors
    ///
    /// [`LoadError::Config`] if a variable is set but cannot be parsed, or
    /// the result fails [`validate`](Self::validate).
    pub fn from_env() -> LoadResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LoadResult<Self> {
        let mut config = Self::default();

        if let Some(s) = lookup("ROADBOX_DATASETS") {
            config.datasets = parse_datasets(&s)?;
        }
        if let Some(s) = lookup("ROADBOX_ROUTING_DATASET") {
            config.routing_dataset = s.trim().to_string();
        }
        if let Some(s) = lookup("ROADBOX_SNAP_TOLERANCE_M") {
            config.snap_tolerance_m = parse_var("ROADBOX_SNAP_TOLERANCE_M", &s)?;
        }
        if let Some(s) = lookup("ROADBOX_MAX_SNAP_DISTANCE_M") {
            config.max_snap_distance_m = parse_var("ROADBOX_MAX_SNAP_DISTANCE_M", &s)?;
        }
        if let Some(s) = lookup("ROADBOX_MAX_EXPANSIONS") {
            config.max_expansions = parse_var("ROADBOX_MAX_EXPANSIONS", &s)?;
        }
        if let Some(s) = lookup("ROADBOX_MAX_FEATURES") {
            config.max_features = parse_var("ROADBOX_MAX_FEATURES", &s)?;
        }
        if let Some(s) = lookup("ROADBOX_KEEP_LARGEST_COMPONENT") {
            config.keep_largest_component = parse_var("ROADBOX_KEEP_LARGEST_COMPONENT", &s)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and that the routing dataset is configured.
    pub fn validate(&self) -> LoadResult<()> {
        if !self.snap_tolerance_m.is_finite() || self.snap_tolerance_m < 0.0 {
            return Err(LoadError::Config(format!(
                "snap tolerance must be a non-negative number of metres, got {}",
                self.snap_tolerance_m
            )));
        }
        if !self.max_snap_distance_m.is_finite() || self.max_snap_distance_m < 0.0 {
            return Err(LoadError::Config(format!(
                "max snap distance must be a non-negative number of metres, got {}",
                self.max_snap_distance_m
            )));
        }
        if self.max_expansions == 0 {
            return Err(LoadError::Config("max expansions must be positive".to_string()));
        }
        if self.max_features == 0 {
            return Err(LoadError::Config("max features must be positive".to_string()));
        }
        if self.default_zoom > rb_geometry::lod::MAX_ZOOM {
            return Err(LoadError::Config(format!("default zoom {} is too high", self.default_zoom)));
        }
        if self.datasets.is_empty() {
            return Err(LoadError::Config("no datasets configured".to_string()));
        }
        if !self.datasets.iter().any(|(name, _)| *name == self.routing_dataset) {
            return Err(LoadError::UnknownRoutingDataset(self.routing_dataset.clone()));
        }
        Ok(())
    }
}

/// Parse `name=path,name=path`.  Names must be unique and non-empty.
pub fn parse_datasets(s: &str) -> LoadResult<Vec<(String, PathBuf)>> {
    let mut out: Vec<(String, PathBuf)> = Vec::new();
    for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, path) = entry
            .split_once('=')
            .map(|(n, p)| (n.trim(), p.trim()))
            .filter(|(n, p)| !n.is_empty() && !p.is_empty())
            .ok_or_else(|| LoadError::Config(format!("dataset entry {entry:?} is not name=path")))?;
        if out.iter().any(|(n, _)| n == name) {
            return Err(LoadError::Config(format!("dataset {name:?} configured twice")));
        }
        out.push((name.to_string(), PathBuf::from(path)));
    }
    Ok(out)
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> LoadResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LoadError::Config(format!("{key}={value:?} is not a valid value")))
}
