//! `roadbox` — load the configured road datasets and answer one query.
//!
//! Results are printed to stdout as JSON; logs go to stderr.
//!
//! ```text
//! roadbox info
//! roadbox route --from 51.50,-0.12 --to 52.48,-1.90
//! roadbox viewport --bbox -0.5,51.3,0.3,51.7 --zoom 9
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rb_core::BBox;
use rb_service::{config::parse_datasets, LatLng, RoadService, RouteRequest, ServiceConfig};

const DEFAULT_LOG_FILTER: &str = "roadbox=info,rb_service=info,rb_geometry=info,rb_network=info";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Datasets as name=path[,name=path...] (overrides ROADBOX_DATASETS)
    #[arg(long)]
    datasets: Option<String>,

    /// Dataset the road network is built from
    #[arg(long)]
    routing_dataset: Option<String>,

    /// Endpoint snap tolerance in metres
    #[arg(long)]
    snap_tolerance: Option<f64>,

    /// Maximum distance from a query point to the network, metres
    #[arg(long)]
    max_snap_distance: Option<f64>,

    /// Keep only the largest connected component of the network
    #[arg(long)]
    keep_largest_component: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print dataset and network statistics
    Info,

    /// Shortest route between two lat,lng points
    Route {
        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        from: LatLng,

        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        to: LatLng,
    },

    /// Road features inside west,south,east,north (default: everywhere)
    Viewport {
        #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
        bbox: Option<BBox>,

        #[arg(long, allow_hyphen_values = true)]
        zoom: Option<i64>,

        /// Dataset to query (defaults to the routing dataset)
        #[arg(long)]
        dataset: Option<String>,
    },
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    parts
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {N} comma-separated numbers, got {}", v.len()))
}

fn parse_lat_lng(s: &str) -> Result<LatLng, String> {
    let [lat, lng] = parse_numbers::<2>(s)?;
    Ok(LatLng { lat, lng })
}

fn parse_bbox(s: &str) -> Result<BBox, String> {
    let [west, south, east, north] = parse_numbers::<4>(s)?;
    Ok(BBox::new(west, south, east, north))
}

fn config_from(args: &Args) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(s) = &args.datasets {
        config.datasets = parse_datasets(s)?;
    }
    if let Some(name) = &args.routing_dataset {
        config.routing_dataset = name.clone();
    }
    if let Some(t) = args.snap_tolerance {
        config.snap_tolerance_m = t;
    }
    if let Some(d) = args.max_snap_distance {
        config.max_snap_distance_m = d;
    }
    if args.keep_largest_component {
        config.keep_largest_component = true;
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let args = Args::parse();
    let config = config_from(&args)?;
    let paths: Vec<&PathBuf> = config.datasets.iter().map(|(_, p)| p).collect();
    let service = RoadService::load(&config)
        .with_context(|| format!("loading datasets {paths:?}"))?;

    match args.command {
        Command::Info => print_json(&service.health())?,
        Command::Route { from, to } => {
            let outcome = service.route_query(&RouteRequest { start: from, end: to });
            print_json(&outcome)?;
            if !outcome.is_ok() {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Viewport { bbox, zoom, dataset } => {
            let features = service.viewport(dataset.as_deref(), bbox.unwrap_or(BBox::WORLD), zoom)?;
            print_json(&features)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
