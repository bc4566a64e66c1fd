//! Hardened club-site backend.
//!
//! Serves the site's static assets and one form endpoint behind a
//! request-filtering pipeline:
//!
//! ```text
//! request → block list → rate limit → pattern scan → session → handler
//!                                                             ↓
//! response ← security headers ←──────────────────────────────┘
//! ```
//!
//! All mutable security state lives in the gatekeeper, constructed once at
//! startup and shared across workers.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use siteguard::config;
use siteguard::http::HttpServer;
use siteguard::lifecycle::{signals, Shutdown};
use siteguard::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "siteguard", about = "Hardened static-site server")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::default_config()?,
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        asset_dir = %config.assets.dir,
        global_limit = config.rate_limit.global_limit,
        form_limit = config.rate_limit.form_limit,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
