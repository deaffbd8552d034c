//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & parse)
//!     → validation.rs (schema checks)
//!     → ConfigSnapshot (immutable, section-scoped key/value source)
//!     → BackendRegistry::from_config
//!
//! On reload signal (file change or SIGHUP):
//!     watcher.rs / lifecycle::signals load a new snapshot
//!     → lifecycle::reload feeds it to BackendRegistry::reload
//! ```
//!
//! # Design Decisions
//! - The registry reads through the `ConfigSource` trait, never TOML directly
//! - A snapshot that fails to load or validate never replaces the current one
//! - Missing or incomplete backend sections are left to the registry to skip

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ConfigSnapshot, ConfigSource, BACKEND_SECTION};
