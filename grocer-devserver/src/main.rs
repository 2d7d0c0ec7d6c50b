//! grocer development backend
//!
//! Serves the bag endpoints from an in-memory catalog so the storefront
//! client can be run and debugged without the real API.
//!
//! Usage:
//!   grocer-devserver --port 8080 --catalog catalog.json --latency-ms 400

use anyhow::{Context, Result};
use clap::Parser;
use grocer_devserver::{build_router, DevBag};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "grocer-devserver")]
#[command(about = "In-memory bag backend for the grocer client")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// JSON catalog of bag entries (built-in catalog if omitted)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Artificial delay added to every response, in milliseconds
    #[arg(long, default_value = "0")]
    latency_ms: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let bag = match &args.catalog {
        Some(path) => DevBag::from_json_file(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => DevBag::seeded(),
    };
    let bag = Arc::new(bag.with_latency(Duration::from_millis(args.latency_ms)));
    info!(
        lines = bag.snapshot().lines().len(),
        latency_ms = args.latency_ms,
        "Bag loaded"
    );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;
    info!("Bag API listening on port {}", args.port);

    axum::serve(listener, build_router(bag))
        .await
        .context("HTTP server failed")?;
    Ok(())
}
