//! taipei — compare the shortest and the lowest-exposure route between two
//! points on a road network.
//!
//! Without `--network` a synthetic lattice around Taipei Main Station is
//! used and the route runs corner to corner.  With `--network` any graph
//! source `er_spatial::load_path` understands is accepted (a directory with
//! `nodes.csv` + `edges.csv`, or a `.json` file).
//!
//! ```text
//! RUST_LOG=info taipei --mode bicycle --pm25 80 --no2 20 --wbgt 0 --out output/taipei
//! taipei --network demos/taipei/data/ximen.json --config demos/taipei/data/config.json \
//!        --from 25.0435,121.5052 --to 25.0436,121.5092
//! ```

mod network;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use er_core::{GeoPoint, RoutingConfig, TransportMode};
use er_output::{ComparisonRow, CsvWriter, OutputWriter};
use er_routing::{ExposureWeights, PointRequest, RouteComparator, RouteComparison};
use er_spatial::{RoadNetwork, load_path};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Graph source: a directory with nodes.csv/edges.csv, or a .json file.
    #[arg(short, long)]
    network: Option<PathBuf>,

    /// Routing configuration (JSON).  Missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Origin as "lat,lon".
    #[arg(long)]
    from: Option<GeoPoint>,

    /// Destination as "lat,lon".
    #[arg(long)]
    to: Option<GeoPoint>,

    /// motor-scooter, bicycle or walk.
    #[arg(short, long, default_value_t = TransportMode::MotorScooter)]
    mode: TransportMode,

    /// PM2.5 weight, 0-100.
    #[arg(long, default_value_t = 50.0)]
    pm25: f64,

    /// NO2 weight, 0-100.
    #[arg(long, default_value_t = 30.0)]
    no2: f64,

    /// Heat (WBGT) weight, 0-100.
    #[arg(long, default_value_t = 80.0)]
    wbgt: f64,

    /// Write comparison.csv and routes.csv into this directory.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let t0 = Instant::now();
    let (network, default_from, default_to) = match &cli.network {
        Some(path) => {
            let net = load_path(path)
                .with_context(|| format!("loading road network from {}", path.display()))?;
            (net, None, None)
        }
        None => {
            let (net, [sw, ne]) = network::build_network();
            let (from, to) = (net.node_pos(sw), net.node_pos(ne));
            (net, Some(from), Some(to))
        }
    };
    log::info!(
        "road network ready in {:.3} s: {} nodes, {} edges",
        t0.elapsed().as_secs_f64(),
        network.node_count(),
        network.edge_count()
    );

    let origin = cli.from.or(default_from).context("--from is required with --network")?;
    let destination = cli.to.or(default_to).context("--to is required with --network")?;

    let comparator = RouteComparator::new(&network, config);
    let request = PointRequest {
        origin,
        destination,
        weights: ExposureWeights::from_sliders(cli.pm25, cli.no2, cli.wbgt),
        mode: cli.mode,
    };

    let t1 = Instant::now();
    let comparison = comparator
        .compare_points(&request)
        .context("route comparison failed")?;
    log::info!("comparison finished in {:.3} ms", t1.elapsed().as_secs_f64() * 1e3);

    print_summary(&network, &comparison);

    if let Some(dir) = &cli.out {
        write_output(dir, &network, &comparison)?;
        println!();
        println!("Wrote {}/comparison.csv and {}/routes.csv", dir.display(), dir.display());
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RoutingConfig> {
    let Some(path) = path else {
        return Ok(RoutingConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: RoutingConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn write_output(dir: &Path, network: &RoadNetwork, comparison: &RouteComparison) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut writer = CsvWriter::new(dir)?;
    writer.write_report(comparison, network)?;
    writer.finish()?;
    Ok(())
}

fn print_summary(network: &RoadNetwork, cmp: &RouteComparison) {
    let origin = network.node_pos(cmp.shortest.path.origin());
    let destination = network.node_pos(cmp.shortest.path.destination());

    println!("=== taipei — exposure-aware route comparison ===");
    println!("Mode: {}  |  Weights: {:?}", cmp.mode, cmp.weights);
    println!("Origin node:      {origin}");
    println!("Destination node: {destination}");
    println!(
        "Shortest:     {:>7.0} m, {:>3} nodes",
        cmp.shortest.stats.distance_m,
        cmp.shortest.path.nodes.len()
    );
    println!(
        "Low exposure: {:>7.0} m, {:>3} nodes",
        cmp.low_exposure.stats.distance_m,
        cmp.low_exposure.path.nodes.len()
    );
    println!();

    println!("{:<12} {:>10} {:>14} {:>10}", "Metric", "Shortest", "Low exposure", "Change");
    println!("{}", "-".repeat(49));
    for row in ComparisonRow::table(cmp) {
        println!(
            "{:<12} {:>10.2} {:>14.2} {:>10}",
            row.metric.as_str(),
            row.shortest,
            row.low_exposure,
            row.change_label()
        );
    }
    println!("Units: minutes (time), µg/m³ per m (PM2.5), ppb per m (NO2), °C (WBGT).");
}
