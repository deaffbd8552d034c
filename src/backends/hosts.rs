//! Reading backend definitions from a configuration source.
//!
//! # Responsibilities
//! - Parse the ordered `backend.backends` id list
//! - Build one [`Backend`] per complete backend section, grouped by host
//! - Parse the legacy `backend.allowed` hostname list

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::backends::backend::{host_key, Backend};
use crate::config::schema::{ConfigSource, BACKEND_SECTION};

/// Host key → backends in match priority order.
pub type HostTable = HashMap<String, Vec<Arc<Backend>>>;

/// True if the source declares explicit backends.
pub fn has_explicit_backends(config: &dyn ConfigSource) -> bool {
    config
        .get_string(BACKEND_SECTION, "backends")
        .is_some_and(|ids| !ids.trim().is_empty())
}

/// Backend ids in configuration order, without blanks or repeats.
pub fn configured_backend_ids(config: &dyn ConfigSource) -> Vec<String> {
    let raw = config
        .get_string(BACKEND_SECTION, "backends")
        .unwrap_or_default();

    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim) {
        if !id.is_empty() && !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Build the host table for explicit backends.
///
/// Incomplete or invalid sections are skipped with a warning.
pub fn configured_hosts(config: &dyn ConfigSource) -> HostTable {
    let mut hosts = HostTable::new();

    for id in configured_backend_ids(config) {
        let Some(mut raw_url) = config.get_string(&id, "url").filter(|u| !u.is_empty()) else {
            tracing::warn!(backend = %id, "Backend is missing or incomplete, skipping");
            continue;
        };
        if !raw_url.ends_with('/') {
            raw_url.push('/');
        }

        let url = match Url::parse(&raw_url) {
            Ok(url) if url.host_str().is_some() => url,
            Ok(_) => {
                tracing::warn!(backend = %id, url = %raw_url, "Backend url has no host, skipping");
                continue;
            }
            Err(e) => {
                tracing::warn!(backend = %id, url = %raw_url, error = %e, "Backend has an invalid url configured, skipping");
                continue;
            }
        };

        let Some(secret) = config.get_string(&id, "secret").filter(|s| !s.is_empty()) else {
            tracing::warn!(backend = %id, "Backend is missing or incomplete, skipping");
            continue;
        };

        hosts
            .entry(host_key(&url))
            .or_default()
            .push(Arc::new(Backend::new(id, &url, secret)));
    }

    hosts
}

/// Host keys of the legacy `allowed` list, first occurrence first.
///
/// Entries are keyed like request URLs (see [`host_key`]) as if served over
/// https, so `host:443` and IDN names match the URLs clients send.
pub fn allowed_hosts(raw: &str) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();

    for entry in raw.split(',') {
        let mut host = entry.trim();
        if let Some((bare, _)) = host.split_once('/') {
            tracing::warn!(hostname = %host, "Removing path from allowed hostname, check your configuration!");
            host = bare;
        }
        if host.is_empty() {
            continue;
        }

        let key = match Url::parse(&format!("https://{host}/")) {
            Ok(url) => host_key(&url),
            Err(e) => {
                tracing::warn!(hostname = %host, error = %e, "Invalid allowed hostname, skipping");
                continue;
            }
        };
        if !key.is_empty() && !hosts.contains(&key) {
            hosts.push(key);
        }
    }

    hosts
}
