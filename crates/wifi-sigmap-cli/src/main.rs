//! wifi-sigmap command-line entry point.
//!
//! Drives the localization and layout engine against a scan backend:
//! a cooperative frame loop fetches live scans, feeds the engine, and
//! periodically pulls the stored vantage snapshots for multilateration.
//! Backend failures are warnings; the loop always continues on
//! last-known state.

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wifi_sigmap_client::BackendClient;
use wifi_sigmap_core::{EngineConfig, GpsFix, MapEngine, Verdict};

/// WiFi signal localization and layout engine
#[derive(Parser, Debug)]
#[command(name = "wifi-sigmap")]
#[command(author, version, about = "Maps nearby access points from signal strength readings")]
struct Cli {
    /// Base URL of the scan backend.
    #[arg(long, default_value = "http://127.0.0.1:8000", global = true)]
    backend: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the live frame loop, logging positions and layout updates
    Watch {
        /// Frame interval in milliseconds.
        #[arg(long, default_value_t = 250)]
        frame_ms: u64,

        /// How often to refresh the stored vantage snapshots, in seconds.
        #[arg(long, default_value_t = 10)]
        data_refresh_secs: u64,

        /// Submit this observer latitude to the backend at startup.
        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        /// Submit this observer longitude to the backend at startup.
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
    },

    /// Collect a rolling analysis window and print the best network
    Analyze {
        /// Frame interval in milliseconds.
        #[arg(long, default_value_t = 250)]
        frame_ms: u64,

        /// Weight of average distance against average signal.
        #[arg(long)]
        distance_weight: Option<f64>,
    },

    /// Print the distance/strength scatter points once
    Scatter {
        /// Aggregate points from all connected scan clients.
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let client = BackendClient::new(&cli.backend)?;

    match cli.command {
        Command::Watch {
            frame_ms,
            data_refresh_secs,
            lat,
            lon,
        } => watch(client, frame_ms, data_refresh_secs, lat.zip(lon)).await,
        Command::Analyze {
            frame_ms,
            distance_weight,
        } => analyze(client, frame_ms, distance_weight).await,
        Command::Scatter { all } => scatter(client, all).await,
    }
}

/// The live frame loop: scan, smooth, position, lay out, repeat.
async fn watch(
    client: BackendClient,
    frame_ms: u64,
    data_refresh_secs: u64,
    observer: Option<(f64, f64)>,
) -> anyhow::Result<()> {
    let mut engine = MapEngine::new();

    if let Some((lat, lon)) = observer {
        client.try_save_gps(GpsFix { lat, lon }).await;
        // A fresh fix deserves fresh synthetic copies.
        if let Err(error) = client.generate_copies().await {
            warn!(%error, "snapshot copy regeneration failed");
        }
    }

    let mut frame = tokio::time::interval(Duration::from_millis(frame_ms));
    let mut refresh = tokio::time::interval(Duration::from_secs(data_refresh_secs));
    info!(backend = %client.base_url(), "frame loop started");

    loop {
        tokio::select! {
            _ = frame.tick() => {
                if let Some(networks) = client.try_fetch_scan().await {
                    engine.ingest_scan(networks);
                }
                if let Some(verdict) = engine.tick(Instant::now()) {
                    info!(?verdict, "rolling analysis finished");
                }

                if engine.positions().is_empty() {
                    let placed = engine.radial_positions();
                    info!(emitters = placed.len(), "radial layout pass");
                } else {
                    info!(
                        live = engine.live().len(),
                        positioned = engine.positions().len(),
                        "multilaterated map pass"
                    );
                }
            }
            _ = refresh.tick() => {
                if let Some(bundle) = client.try_fetch_bundle().await {
                    let solved = engine.update_positions(&bundle);
                    info!(solved, "vantage snapshots refreshed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping");
                return Ok(());
            }
        }
    }
}

/// Run one rolling analysis window to completion and print the verdict.
async fn analyze(
    client: BackendClient,
    frame_ms: u64,
    distance_weight: Option<f64>,
) -> anyhow::Result<()> {
    let mut config = EngineConfig::default();
    if let Some(weight) = distance_weight {
        config.analysis.distance_weight = weight;
    }
    let mut engine = MapEngine::with_config(config);
    engine.begin_analysis(Instant::now())?;
    info!(
        window_ms = config.analysis.window.as_millis() as u64,
        "collecting rolling analysis window"
    );

    let mut frame = tokio::time::interval(Duration::from_millis(frame_ms));
    loop {
        frame.tick().await;
        if let Some(networks) = client.try_fetch_scan().await {
            engine.ingest_scan(networks);
        }

        match engine.tick(Instant::now()) {
            Some(Verdict::Recommendation(r)) => {
                println!(
                    "best network: {} ({}) - avg signal {:.1} dBm, avg distance {:.1} m, score {:.1}",
                    r.id, r.band, r.avg_signal, r.avg_distance, r.score
                );
                return Ok(());
            }
            Some(Verdict::NoData) => {
                println!("no network collected enough samples");
                return Ok(());
            }
            None => {}
        }
    }
}

/// Fetch and print the distance/strength scatter points.
async fn scatter(client: BackendClient, all: bool) -> anyhow::Result<()> {
    let response = client.fetch_distance_strength(all).await?;
    for point in &response.points {
        println!(
            "{:<20} {:<18} {:>8} {:>9.1} dBm {:>8.1} m",
            point.ssid.as_deref().unwrap_or("<hidden>"),
            point.bssid,
            point.band.as_deref().unwrap_or("?"),
            point.rssi,
            point.distance
        );
    }
    println!("{} points", response.points.len());
    Ok(())
}
