//! dwellscan - clusters vehicle GPS ping files into dwell locations.

mod report;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dwell_cluster::{DensityClusterer, FrameSplit, Observation, Params, PlanarNeighbors};
use dwell_geo::{LocalProjection, LonLat};
use tracing::info;

use report::Record;

/// Clusters a JSON file of GPS pings into dwell locations.
///
/// Pings close in both space and time are grouped with DBSCAN semantics,
/// processed incrementally over overlapping time frames so arbitrarily
/// long recordings stay tractable.
#[derive(Parser, Debug)]
#[command(name = "dwellscan")]
#[command(about = "Clusters vehicle GPS ping files into dwell locations")]
struct Args {
    /// Input JSON file: an array of {lon, lat, unix_time, vehicle_ref?, speed_ms?}
    #[arg(short = 'f', long)]
    input: PathBuf,

    /// Spatial radius in meters
    #[arg(long, default_value_t = 300.0)]
    d_eps: f64,

    /// Temporal radius in seconds
    #[arg(long, default_value_t = 200)]
    t_eps: i64,

    /// Minimum neighborhood size for a core point
    #[arg(long, default_value_t = 3)]
    min_samples: usize,

    /// Frame length in seconds (default: 4 * t_eps)
    #[arg(long)]
    frame_size: Option<i64>,

    /// Frame overlap in seconds (default: 2 * t_eps)
    #[arg(long)]
    frame_overlap: Option<i64>,

    /// Keep only pings slower than this speed in m/s (dwell filtering)
    #[arg(long)]
    max_speed: Option<f64>,

    /// Cluster the whole file in one pass instead of frame-splitting
    #[arg(long)]
    single_frame: bool,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut records: Vec<Record> =
        serde_json::from_str(&raw).context("parsing input records")?;

    if let Some(max_speed) = args.max_speed {
        let before = records.len();
        records.retain(|r| r.speed_ms.is_some_and(|s| s < max_speed));
        info!(kept = records.len(), dropped = before - records.len(), "speed filter applied");
    }
    records.sort_by_key(|r| r.unix_time);
    info!(records = records.len(), "records ready for clustering");

    let stream = project(&records);
    let params = Params {
        d_eps: args.d_eps,
        t_eps: args.t_eps,
        min_samples: args.min_samples,
        frame_size: args.frame_size,
        frame_overlap: args.frame_overlap,
    };

    let labels: BTreeMap<i64, i32> = if args.single_frame {
        let mut clusterer = DensityClusterer::new(params, PlanarNeighbors::new())?;
        let assignment = clusterer.fit(&stream)?;
        stream
            .iter()
            .zip(assignment.labels.iter())
            .map(|(o, &l)| (o.id, l))
            .collect()
    } else {
        FrameSplit::new(params, PlanarNeighbors::new())?.run(&stream)?
    };

    let report = report::build(&records, &labels);
    info!(
        clusters = report.clusters.len(),
        noise = report.labels.iter().filter(|p| p.cluster == -1).count(),
        "clustering finished"
    );

    let out = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            fs::write(path, out).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{out}"),
    }
    Ok(())
}

/// Projects sorted records onto a local metric plane, using the record's
/// position in the sorted stream as its stable observation id.
fn project(records: &[Record]) -> Vec<Observation> {
    let coords: Vec<LonLat> = records.iter().map(|r| LonLat::new(r.lon, r.lat)).collect();
    let proj = LocalProjection::for_extent(&coords);
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let p = proj.project(LonLat::new(r.lon, r.lat));
            Observation {
                id: i as i64,
                unix_time: r.unix_time,
                x: p.x,
                y: p.y,
            }
        })
        .collect()
}
