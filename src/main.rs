//! CLI entry point for the satellite path-utilization visualizer.
//!
//! Provides subcommands for rendering one end-to-end path at a query
//! instant as a Cesium HTML scene, and for printing the resolved path and
//! per-hop utilization as JSON without rendering.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sat_path_viz::cities::CityDetails;
use sat_path_viz::encode::encode;
use sat_path_viz::orbit::ShellConfig;
use sat_path_viz::output::write_viz_file;
use sat_path_viz::parser::{read_path_events, read_utilization_log};
use sat_path_viz::scene::{SceneRenderer, to_cesium_js};
use sat_path_viz::timeline::{NodeId, PathTimeline};
use sat_path_viz::util_index::{UTIL_INTERVAL, UtilizationIndex};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sat_path_viz")]
#[command(about = "Visualize per-hop link utilization of a satellite network path", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the path active at a query instant as a Cesium HTML scene
    Render {
        /// Path-change event log (timestamp_ns,<id>-<id>-... per line)
        #[arg(long, value_name = "FILE")]
        paths: PathBuf,

        /// Link utilization log (src,dst,start_ns,end_ns,utilization per line)
        #[arg(long, value_name = "FILE")]
        util: PathBuf,

        /// City detail file for ground-station names
        #[arg(long, value_name = "FILE")]
        cities: PathBuf,

        /// Query instant in milliseconds since scenario start
        #[arg(short, long, default_value_t = 10_000)]
        time_ms: u64,

        /// Constellation preset (starlink_550, kuiper_630, telesat_1015)
        #[arg(short, long, default_value = "telesat_1015")]
        constellation: String,

        /// HTML header template
        #[arg(long, default_value = "static_html/top.html")]
        top: PathBuf,

        /// HTML footer template
        #[arg(long, default_value = "static_html/bottom.html")]
        bottom: PathBuf,

        /// Directory for the rendered HTML file
        #[arg(short, long, default_value = "viz_output")]
        out_dir: PathBuf,
    },
    /// Resolve the active path and per-hop utilization, print as JSON
    Resolve {
        /// Path-change event log
        #[arg(long, value_name = "FILE")]
        paths: PathBuf,

        /// Link utilization log
        #[arg(long, value_name = "FILE")]
        util: PathBuf,

        /// Query instant in milliseconds since scenario start
        #[arg(short, long, default_value_t = 10_000)]
        time_ms: u64,
    },
}

/// One colored hop in the `resolve` diagnostic output.
#[derive(Serialize)]
struct HopReport {
    a: NodeId,
    b: NodeId,
    utilization: f64,
    color: String,
    width: f64,
}

/// Full `resolve` diagnostic output.
#[derive(Serialize)]
struct ResolveReport {
    query_time_ms: u64,
    active_since_ms: u64,
    path: Vec<NodeId>,
    hops: Vec<HopReport>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/sat_path_viz.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("sat_path_viz.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            paths,
            util,
            cities,
            time_ms,
            constellation,
            top,
            bottom,
            out_dir,
        } => {
            render(
                &paths,
                &util,
                &cities,
                time_ms,
                &constellation,
                &top,
                &bottom,
                &out_dir,
            )
            .await?;
        }
        Commands::Resolve {
            paths,
            util,
            time_ms,
        } => {
            let (timeline, index) = ingest(&paths, &util).await?;
            let resolved = timeline.resolve(time_ms);
            info!(
                active_since_ms = resolved.active_since_ms,
                nodes = resolved.nodes.len(),
                "Path resolved"
            );

            let window_start = time_ms.saturating_sub(UTIL_INTERVAL);
            let mut hops = Vec::new();
            for p in 1..resolved.nodes.len().saturating_sub(2) {
                let (a, b) = (resolved.nodes[p], resolved.nodes[p + 1]);
                let utilization = index.hop_utilization(a, b, window_start, time_ms)?;
                let style = encode(utilization);
                hops.push(HopReport {
                    a,
                    b,
                    utilization,
                    color: style.color,
                    width: style.width,
                });
            }

            let report = ResolveReport {
                query_time_ms: time_ms,
                active_since_ms: resolved.active_since_ms,
                path: resolved.nodes,
                hops,
            };
            info!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Reads both simulation logs concurrently (they have no data dependency)
/// and builds the timeline and utilization index from the results.
#[tracing::instrument(fields(paths = %paths.display(), util = %util.display()))]
async fn ingest(paths: &Path, util: &Path) -> Result<(PathTimeline, UtilizationIndex)> {
    let paths = paths.to_path_buf();
    let util = util.to_path_buf();

    let (events, samples) = tokio::join!(
        tokio::task::spawn_blocking(move || read_path_events(&paths)),
        tokio::task::spawn_blocking(move || read_utilization_log(&util)),
    );
    let events = events??;
    let samples = samples??;

    let timeline = PathTimeline::build(events);
    let index = UtilizationIndex::build(&samples)?;
    info!(
        events = timeline.len(),
        buckets = index.len(),
        "Simulation artifacts ingested"
    );

    Ok((timeline, index))
}

/// Full batch pass: ingest, resolve, propagate, render, persist.
#[tracing::instrument(skip_all, fields(time_ms, constellation))]
async fn render(
    paths: &Path,
    util: &Path,
    cities: &Path,
    time_ms: u64,
    constellation: &str,
    top: &Path,
    bottom: &Path,
    out_dir: &Path,
) -> Result<()> {
    let shell = ShellConfig::by_name(constellation)
        .with_context(|| format!("unknown constellation preset {constellation:?}"))?;

    let (timeline, index) = ingest(paths, util).await?;
    let city_details = CityDetails::load(cities)?;

    let resolved = timeline.resolve(time_ms);
    info!(
        active_since_ms = resolved.active_since_ms,
        nodes = resolved.nodes.len(),
        "Path resolved"
    );

    let positions = shell.satellite_positions(time_ms);
    info!(
        shell = shell.name,
        epoch = %shell.shifted_epoch(time_ms),
        satellites = positions.len(),
        "Constellation propagated"
    );

    let renderer = SceneRenderer {
        shell: &shell,
        cities: &city_details,
    };
    let out_stem = out_dir
        .join(format!("{}_path_wise_util", shell.name))
        .to_string_lossy()
        .into_owned();
    let scene = renderer.render(&resolved, &positions, &index, time_ms, &out_stem)?;
    info!(entities = scene.entities.len(), "Scene assembled");

    let entities_js = to_cesium_js(&scene.entities);
    write_viz_file(&entities_js, top, bottom, Path::new(&scene.out_file_name))?;

    Ok(())
}
