//! Backend lookup by origin URL.
//!
//! # Responsibilities
//! - Build the host table from configuration in one of three modes
//! - Resolve a request URL to the backend authorized for it
//! - Hand out the secret of that backend
//!
//! # Design Decisions
//! - The host table sits behind an `ArcSwap`; every lookup works on one loaded
//!   table, so a reload is never observed half-applied
//! - Within a host, entries are checked in configuration order (first match wins)
//! - Allow-all and legacy settings are fixed at construction

use std::sync::Arc;

use arc_swap::ArcSwap;
use url::Url;

use crate::backends::backend::{host_key, normalize_url, Backend};
use crate::backends::hosts::{allowed_hosts, configured_hosts, has_explicit_backends, HostTable};
use crate::config::schema::{ConfigSource, BACKEND_SECTION};

/// Maps request origins to tenant backends.
pub struct BackendRegistry {
    pub(super) hosts: ArcSwap<HostTable>,
    allow_all: bool,
    common_secret: Vec<u8>,
    compat_backend: Option<Arc<Backend>>,
}

impl BackendRegistry {
    /// Build the registry from configuration.
    ///
    /// Modes, in priority order: `allowall`, explicit `backends`, legacy `allowed`.
    pub fn from_config(config: &dyn ConfigSource) -> Self {
        let allow_all = config
            .get_bool(BACKEND_SECTION, "allowall")
            .unwrap_or(false);
        let common_secret = config
            .get_string(BACKEND_SECTION, "secret")
            .unwrap_or_default()
            .into_bytes();
        let allowed = config
            .get_string(BACKEND_SECTION, "allowed")
            .filter(|allowed| !allowed.trim().is_empty());

        let mut hosts = HostTable::new();
        let mut compat_backend = None;

        if allow_all {
            tracing::warn!("All backend hostnames are allowed, only use for development!");
            compat_backend = Some(Arc::new(Backend::compat(common_secret.clone())));
        } else if has_explicit_backends(config) {
            if allowed.is_some() {
                tracing::warn!("Both \"backends\" and \"allowed\" are configured, ignoring \"allowed\"");
            }
            hosts = configured_hosts(config);
            for backend in hosts.values().flatten() {
                tracing::info!(backend = %backend.id(), url = %backend.url(), "Backend added");
            }
        } else if let Some(allowed) = allowed {
            // Old-style configuration, only hosts are configured and share one secret.
            let allowed = allowed_hosts(&allowed);
            if allowed.is_empty() {
                tracing::warn!("No backend hostnames are allowed, check your configuration!");
            } else {
                if allowed.len() > 1 {
                    tracing::warn!("Using deprecated backend configuration. Please migrate the \"allowed\" setting to the new \"backends\" configuration.");
                }
                tracing::info!(hosts = ?allowed, "Allowed backend hostnames");

                let compat = Arc::new(Backend::compat(common_secret.clone()));
                for host in allowed {
                    hosts.insert(host, vec![compat.clone()]);
                }
                compat_backend = Some(compat);
            }
        } else {
            tracing::warn!("No backends configured, all backend requests will be rejected");
        }

        Self {
            hosts: ArcSwap::from_pointee(hosts),
            allow_all,
            common_secret,
            compat_backend,
        }
    }

    /// Find the backend authorized for `url`.
    ///
    /// Configured entries win. With allow-all active, any URL no entry claims
    /// (unknown host or path miss on a known host) gets the compat backend.
    pub fn resolve(&self, url: &Url) -> Option<Arc<Backend>> {
        let matched = self.hosts.load().get(&host_key(url)).and_then(|entries| {
            let candidate = normalize_url(url);
            entries
                .iter()
                .find(|entry| entry.matches(&candidate))
                .cloned()
        });

        match matched {
            Some(backend) => Some(backend),
            None if self.allow_all => self.compat_backend.clone(),
            None => None,
        }
    }

    /// Like [`resolve`](Self::resolve) for a raw string; unparsable URLs never resolve.
    pub fn resolve_str(&self, url: &str) -> Option<Arc<Backend>> {
        Url::parse(url).ok().and_then(|url| self.resolve(&url))
    }

    /// Whether requests from `url` are accepted. A missing URL never is.
    pub fn is_url_allowed(&self, url: Option<&Url>) -> bool {
        url.and_then(|url| self.resolve(url)).is_some()
    }

    /// Secret of the backend for `url`, or `None` if the URL is missing or unknown.
    pub fn secret_for(&self, url: Option<&Url>) -> Option<Vec<u8>> {
        let backend = self.resolve(url?)?;
        Some(backend.secret().to_vec())
    }

    /// The shared backend of the allow-all and legacy modes.
    pub fn compat_backend(&self) -> Option<Arc<Backend>> {
        self.compat_backend.clone()
    }

    pub fn is_allow_all(&self) -> bool {
        self.allow_all
    }

    /// Secret configured in the `backend` section.
    pub fn common_secret(&self) -> &[u8] {
        &self.common_secret
    }

    /// Configured host keys, sorted.
    pub fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.hosts.load().keys().cloned().collect();
        hosts.sort();
        hosts
    }

    /// Every configured backend once, ordered by host then priority.
    pub fn backends(&self) -> Vec<Arc<Backend>> {
        let table = self.hosts.load();
        let mut entries: Vec<_> = table.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut result: Vec<Arc<Backend>> = Vec::new();
        for backend in entries.into_iter().flat_map(|(_, list)| list) {
            if !result.iter().any(|known| Arc::ptr_eq(known, backend)) {
                result.push(backend.clone());
            }
        }
        result
    }
}
