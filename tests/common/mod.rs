//! Shared helpers for registry and protocol integration tests.

use signaling_core::{BackendRegistry, ConfigSnapshot};
use url::Url;

/// Parse a TOML configuration snapshot.
pub fn snapshot(toml: &str) -> ConfigSnapshot {
    toml.parse().expect("test config must parse")
}

/// Build a registry from TOML.
#[allow(dead_code)]
pub fn registry(toml: &str) -> BackendRegistry {
    BackendRegistry::from_config(&snapshot(toml))
}

/// Explicit-mode configuration with `(id, url, secret)` backends in order.
#[allow(dead_code)]
pub fn explicit_config(backends: &[(&str, &str, &str)]) -> String {
    let ids: Vec<&str> = backends.iter().map(|(id, _, _)| *id).collect();
    let mut config = format!("[backend]\nbackends = \"{}\"\n", ids.join(", "));
    for (id, url, secret) in backends {
        config.push_str(&format!("\n[{id}]\nurl = \"{url}\"\nsecret = \"{secret}\"\n"));
    }
    config
}

#[allow(dead_code)]
pub fn url(s: &str) -> Url {
    Url::parse(s).expect("test url must parse")
}

/// Id of the backend `candidate` resolves to.
#[allow(dead_code)]
pub fn resolved_id(registry: &BackendRegistry, candidate: &str) -> Option<String> {
    registry
        .resolve(&url(candidate))
        .map(|backend| backend.id().to_string())
}
