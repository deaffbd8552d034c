//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent one tenant allowed to talk to the signaling server
//! - Hold the shared secret used to verify its requests
//! - Decide whether a normalized request URL belongs to it

use std::fmt;

use url::Url;

/// Identifier of the single backend used by the compat modes.
pub const COMPAT_BACKEND_ID: &str = "compat";

/// A single tenant backend.
///
/// Immutable once built. Equality compares every field, which is what reload
/// uses to decide whether an entry changed.
#[derive(Clone, PartialEq, Eq)]
pub struct Backend {
    id: String,
    /// Normalized origin URL with trailing `/`, or empty for host-only matching.
    url: String,
    secret: Vec<u8>,
    compat: bool,
}

impl Backend {
    /// Create a backend for `url`, which is normalized to end with `/`.
    pub fn new(id: impl Into<String>, url: &Url, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            url: normalize_url(url),
            secret: secret.into(),
            compat: false,
        }
    }

    /// The host-only backend shared by the allow-all and legacy modes.
    pub fn compat(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            id: COMPAT_BACKEND_ID.to_string(),
            url: String::new(),
            secret: secret.into(),
            compat: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Origin URL prefix. Empty means any URL on the host matches.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn is_compat(&self) -> bool {
        self.compat
    }

    /// Whether a URL already passed through [`normalize_url`] belongs to this backend.
    pub fn matches(&self, normalized: &str) -> bool {
        self.url.is_empty() || normalized.starts_with(&self.url)
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("secret", &"[REDACTED]")
            .field("compat", &self.compat)
            .finish()
    }
}

/// Serialized form of `url` guaranteed to end with `/`.
pub fn normalize_url(url: &Url) -> String {
    let mut normalized = url.as_str().to_owned();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Registry key for the host of `url`, including a non-default port.
pub fn host_key(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host.to_ascii_lowercase(), port),
        (Some(host), None) => host.to_ascii_lowercase(),
        (None, _) => String::new(),
    }
}
