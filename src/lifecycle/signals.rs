//! OS signal handling.
//!
//! # Responsibilities
//! - Turn SIGHUP into a configuration reload
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A snapshot that fails to load is logged and dropped
//! - On non-unix targets the forwarder only waits for shutdown

use std::path::PathBuf;

use tokio::sync::{broadcast, mpsc};

use crate::config::schema::ConfigSnapshot;

/// Reload the configuration file on every SIGHUP until shutdown.
#[cfg(unix)]
pub async fn forward_hangups(
    path: PathBuf,
    updates: mpsc::UnboundedSender<ConfigSnapshot>,
    mut shutdown: broadcast::Receiver<()>,
) {
    use tokio::signal::unix::{signal, SignalKind};

    use crate::config::watcher::publish_snapshot;

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGHUP handler");
            return;
        }
    };

    loop {
        tokio::select! {
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }
                tracing::info!(path = ?path, "SIGHUP received, reloading configuration");
                if !publish_snapshot(&path, &updates) {
                    break;
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

#[cfg(not(unix))]
pub async fn forward_hangups(
    _path: PathBuf,
    _updates: mpsc::UnboundedSender<ConfigSnapshot>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let _ = shutdown.recv().await;
}
