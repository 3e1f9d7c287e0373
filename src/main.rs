//! Vanity path filter server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout ─▶ vanity filter ──┬── pass through ──▶ content service
//!                                                            │           │
//!                                                            ▼           └── forward(target) ─▶ content service
//!                                                     VanityResolver
//!                                                  (live RuleSet snapshot)
//!                                                            ▲
//!                               config file / SIGHUP ────────┘  atomic swap on reload
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use vanity_filter::config::{load_config, ConfigWatcher, FilterConfig};
use vanity_filter::lifecycle::signals::{shutdown_on_signal, spawn_reload_on_sighup};
use vanity_filter::observability::{logging, metrics};
use vanity_filter::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "vanity-filter")]
#[command(about = "Serves content behind a vanity path filter", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not watch the configuration file for changes.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FilterConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("vanity-filter v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        root_paths = ?config.vanity.root_paths,
        content = config.content.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // Keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            spawn_reload_on_sighup(path.clone(), watcher.sender());
            let handle = if cli.no_watch {
                None
            } else {
                Some(watcher.run()?)
            };
            (updates, handle)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signals = shutdown.clone();
    tokio::spawn(async move {
        shutdown_on_signal(&signals).await;
    });

    let server = HttpServer::new(config);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
