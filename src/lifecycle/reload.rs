//! Runtime reload of the backend registry.
//!
//! # Responsibilities
//! - Apply every new configuration snapshot to the shared registry
//! - Wire the file watcher and SIGHUP to the same update channel
//! - Stop cleanly on shutdown

use std::path::Path;
use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::backends::{BackendRegistry, ReloadOutcome};
use crate::config::schema::ConfigSnapshot;
use crate::config::watcher::ConfigWatcher;
use crate::lifecycle::signals::forward_hangups;

/// Apply snapshots from `updates` until the channel closes or shutdown fires.
pub async fn run_reload_loop(
    registry: Arc<BackendRegistry>,
    mut updates: mpsc::UnboundedReceiver<ConfigSnapshot>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(snapshot) = update else {
                    break;
                };
                match registry.reload(&snapshot) {
                    ReloadOutcome::Skipped => {
                        tracing::info!("Configuration reloaded, backend mode settings only apply at startup");
                    }
                    ReloadOutcome::Applied(summary) if summary.is_unchanged() => {
                        tracing::debug!("Configuration reloaded, backends unchanged");
                    }
                    ReloadOutcome::Applied(_) => {}
                }
            }
            _ = shutdown.recv() => break,
        }
    }
    tracing::info!("Backend reload loop stopped");
}

/// Background tasks keeping a registry in sync with its configuration file.
pub struct ReloadService {
    _watcher: RecommendedWatcher,
    hangups: JoinHandle<()>,
    reloads: JoinHandle<()>,
}

impl ReloadService {
    /// Watch `path` and reload `registry` on file changes and SIGHUP.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        registry: Arc<BackendRegistry>,
        path: &Path,
        shutdown: &broadcast::Sender<()>,
    ) -> Result<Self, notify::Error> {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let watcher = ConfigWatcher::new(path, update_tx.clone()).run()?;
        let hangups = tokio::spawn(forward_hangups(
            path.to_path_buf(),
            update_tx,
            shutdown.subscribe(),
        ));
        let reloads = tokio::spawn(run_reload_loop(registry, update_rx, shutdown.subscribe()));

        Ok(Self {
            _watcher: watcher,
            hangups,
            reloads,
        })
    }

    /// Wait for the background tasks to finish after shutdown was triggered.
    pub async fn join(self) {
        let _ = self.hangups.await;
        let _ = self.reloads.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const FIRST: &str = r#"
        [backend]
        backends = "one"

        [one]
        url = "https://one.example.com/"
        secret = "1"
    "#;

    const SECOND: &str = r#"
        [backend]
        backends = "two"

        [two]
        url = "https://two.example.com/"
        secret = "2"
    "#;

    fn registry() -> Arc<BackendRegistry> {
        let config: ConfigSnapshot = FIRST.parse().unwrap();
        Arc::new(BackendRegistry::from_config(&config))
    }

    #[tokio::test]
    async fn test_loop_applies_updates() {
        let registry = registry();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel(1);

        let task = tokio::spawn(run_reload_loop(
            registry.clone(),
            update_rx,
            shutdown_tx.subscribe(),
        ));

        update_tx.send(SECOND.parse().unwrap()).unwrap();
        drop(update_tx);
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();

        assert!(registry.resolve_str("https://one.example.com/").is_none());
        assert_eq!(registry.resolve_str("https://two.example.com/x").unwrap().id(), "two");
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let (_update_tx, update_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel(1);

        let task = tokio::spawn(run_reload_loop(registry(), update_rx, shutdown_tx.subscribe()));
        shutdown_tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_service_starts_and_stops() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", FIRST).unwrap();

        let (shutdown_tx, _) = broadcast::channel(1);
        let service = ReloadService::start(registry(), file.path(), &shutdown_tx).unwrap();

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), service.join())
            .await
            .unwrap();
    }
}
