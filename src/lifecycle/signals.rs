//! OS signal handling.
//!
//! # Responsibilities
//! - Translate SIGTERM/SIGINT into a graceful shutdown
//! - Translate SIGHUP into a config reload
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::config::watcher::reload_into;
use crate::config::FilterConfig;
use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C (and SIGTERM on unix), then trigger `shutdown`.
pub async fn shutdown_on_signal(shutdown: &Shutdown) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
    shutdown.trigger();
}

/// Reload `path` into `tx` on every SIGHUP.
#[cfg(unix)]
pub fn spawn_reload_on_sighup(path: PathBuf, tx: mpsc::UnboundedSender<FilterConfig>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            tracing::info!(path = ?path, "SIGHUP received, reloading configuration");
            if !reload_into(&path, &tx) && tx.is_closed() {
                break;
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_reload_on_sighup(_path: PathBuf, _tx: mpsc::UnboundedSender<FilterConfig>) {}
