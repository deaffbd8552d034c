//! Applying a new configuration snapshot to a live registry.
//!
//! # Data Flow
//! ```text
//! ConfigSnapshot
//!     → hosts::configured_hosts (target table)
//!     → apply() on a private copy of the current table
//!         - hosts missing from the target are dropped
//!         - value-equal entries are carried over, new ones added, stale ones removed
//!     → ArcSwap::rcu publishes the copy in one pointer swap
//! ```

use std::sync::Arc;

use crate::backends::backend::Backend;
use crate::backends::hosts::{configured_hosts, has_explicit_backends, HostTable};
use crate::backends::registry::BackendRegistry;
use crate::config::schema::ConfigSource;

/// What a reload changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    /// Entries carried over unchanged.
    pub kept: usize,
    pub added: usize,
    pub removed: usize,
    /// Hosts no longer configured, sorted.
    pub hosts_removed: Vec<String>,
}

impl ReloadSummary {
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.hosts_removed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The snapshot declares no explicit backends; the registry was left alone.
    Skipped,
    Applied(ReloadSummary),
}

impl BackendRegistry {
    /// Bring the registry in line with `config`.
    ///
    /// Only explicit `backends` configurations are reloaded; allow-all and
    /// legacy settings keep their startup values.
    pub fn reload(&self, config: &dyn ConfigSource) -> ReloadOutcome {
        if !has_explicit_backends(config) {
            tracing::debug!("No explicit backends in new configuration, keeping current backends");
            return ReloadOutcome::Skipped;
        }

        let target = configured_hosts(config);
        let mut summary = ReloadSummary::default();
        self.hosts.rcu(|current| {
            let (next, applied) = apply(current, &target);
            summary = applied;
            next
        });

        for host in &summary.hosts_removed {
            tracing::info!(host = %host, "Backend host removed");
        }
        tracing::info!(
            kept = summary.kept,
            added = summary.added,
            removed = summary.removed,
            "Backends reloaded"
        );
        ReloadOutcome::Applied(summary)
    }
}

/// Compute the table that replaces `current`.
fn apply(current: &HostTable, target: &HostTable) -> (HostTable, ReloadSummary) {
    let mut summary = ReloadSummary::default();

    for (host, entries) in current {
        if !target.contains_key(host) {
            summary.removed += entries.len();
            summary.hosts_removed.push(host.clone());
        }
    }
    summary.hosts_removed.sort();

    let mut next = HostTable::with_capacity(target.len());
    for (host, wanted) in target {
        let existing = current.get(host).map(Vec::as_slice).unwrap_or_default();
        next.insert(host.clone(), upsert_host(existing, wanted, &mut summary));
    }

    (next, summary)
}

/// Merge the wanted entries of one host with the existing ones.
///
/// The result follows the order of `wanted`; entries equal to an existing one
/// reuse the existing `Arc`.
pub fn upsert_host(
    existing: &[Arc<Backend>],
    wanted: &[Arc<Backend>],
    summary: &mut ReloadSummary,
) -> Vec<Arc<Backend>> {
    let merged: Vec<Arc<Backend>> = wanted
        .iter()
        .map(|backend| match existing.iter().find(|current| **current == *backend) {
            Some(current) => {
                summary.kept += 1;
                current.clone()
            }
            None => {
                summary.added += 1;
                backend.clone()
            }
        })
        .collect();

    summary.removed += existing
        .iter()
        .filter(|current| !wanted.iter().any(|backend| *backend == **current))
        .count();

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn backend(id: &str, url: &str, secret: &str) -> Arc<Backend> {
        Arc::new(Backend::new(id, &Url::parse(url).unwrap(), secret))
    }

    #[test]
    fn test_upsert_reuses_equal_entries() {
        let a = backend("a", "https://h/a/", "1");
        let b = backend("b", "https://h/b/", "2");
        let existing = vec![a.clone(), b.clone()];

        let wanted = vec![
            backend("c", "https://h/c/", "3"),
            backend("a", "https://h/a/", "1"),
            backend("b", "https://h/b/", "changed"),
        ];

        let mut summary = ReloadSummary::default();
        let merged = upsert_host(&existing, &wanted, &mut summary);

        let ids: Vec<&str> = merged.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert!(Arc::ptr_eq(&merged[1], &a));
        assert!(!Arc::ptr_eq(&merged[2], &b));
        assert_eq!(merged[2].secret(), b"changed");
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.added, 2);
        assert_eq!(summary.removed, 1);
    }

    #[test]
    fn test_apply_drops_missing_hosts() {
        let mut current = HostTable::new();
        current.insert("old".into(), vec![backend("o", "https://old/", "1")]);
        current.insert("h".into(), vec![backend("a", "https://h/a/", "1")]);

        let mut target = HostTable::new();
        target.insert("h".into(), vec![backend("a", "https://h/a/", "1")]);

        let (next, summary) = apply(&current, &target);
        assert!(!next.contains_key("old"));
        assert!(Arc::ptr_eq(&next["h"][0], &current["h"][0]));
        assert_eq!(summary.hosts_removed, vec!["old".to_string()]);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.kept, 1);
        assert!(!summary.is_unchanged());
    }
}
