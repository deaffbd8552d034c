//! Configuration file watcher for hot reload.
//!
//! Both reload triggers (file changes here, SIGHUP in `lifecycle::signals`)
//! go through [`publish_snapshot`], so a file that fails to load is handled
//! the same way no matter who noticed the change.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::EventKind;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ConfigSnapshot;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Load `path` and send the snapshot on `updates`.
///
/// A load failure is logged and nothing is sent. Returns `false` once the
/// receiving side is gone.
pub fn publish_snapshot(path: &Path, updates: &mpsc::UnboundedSender<ConfigSnapshot>) -> bool {
    match load_config(path) {
        Ok(snapshot) => updates.send(snapshot).is_ok(),
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to reload config, keeping current backends");
            !updates.is_closed()
        }
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

/// Watches one configuration file and publishes a snapshot per change.
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<ConfigSnapshot>,
}

impl ConfigWatcher {
    pub fn new(path: &Path, updates: mpsc::UnboundedSender<ConfigSnapshot>) -> Self {
        Self {
            path: path.to_path_buf(),
            updates,
        }
    }

    /// Start watching in notify's background thread.
    ///
    /// Events stop once the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, updates } = self;
        let watched = path.clone();

        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) if is_content_change(&event.kind) => {
                tracing::info!(path = ?watched, "Config file change detected, reloading");
                publish_snapshot(&watched, &updates);
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = ?e, "Watch error"),
        };

        let mut watcher =
            RecommendedWatcher::new(handler, Config::default().with_poll_interval(POLL_INTERVAL))?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
