//! Stormcatchment CLI
//!
//! Delineates the network-corrected catchment of one pour point and prints a
//! JSON summary.
//!
//! # Usage
//!
//! ```bash
//! stormcatchment --dem dem.asc --points structures.geojson --lines conduits.geojson \
//!     --x 1523.5 --y 880.0 --config stormcatchment.yaml
//!
//! # Verbose engine decisions
//! RUST_LOG=stormcatchment=debug stormcatchment ...
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stormcatchment::features::network::infrastructure::geojson;
use stormcatchment::{preprocess_dem, Delineate, Point, StormConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stormcatchment")]
#[command(about = "Network-corrected catchment delineation", long_about = None)]
struct Cli {
    /// ESRI ASCII grid DEM
    #[arg(long)]
    dem: PathBuf,

    /// GeoJSON FeatureCollection of structures (points)
    #[arg(long)]
    points: PathBuf,

    /// GeoJSON FeatureCollection of conduits (lines)
    #[arg(long)]
    lines: PathBuf,

    /// Pour point x
    #[arg(long, allow_hyphen_values = true)]
    x: f64,

    /// Pour point y
    #[arg(long, allow_hyphen_values = true)]
    y: f64,

    /// YAML v1 configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => StormConfig::from_yaml(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => StormConfig::default(),
    };

    let grid = preprocess_dem(&cli.dem)
        .with_context(|| format!("preprocessing DEM {}", cli.dem.display()))?;
    let points = geojson::read_points(&cli.points, &config.network.id_field)
        .with_context(|| format!("reading structures {}", cli.points.display()))?;
    let lines = geojson::read_lines(&cli.lines, &config.network.id_field)
        .with_context(|| format!("reading conduits {}", cli.lines.display()))?;

    let engine = Delineate::from_parts(&points, &lines, grid, &config)?;
    let result = engine.get_stormcatchment(Point::new(cli.x, cli.y))?;

    let summary = result.summary();
    let json = if cli.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{}", json);
    Ok(())
}
