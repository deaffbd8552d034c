//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Reload (reload.rs):
//!     config file change (watcher) ─┐
//!     SIGHUP (signals.rs) ──────────┴→ mpsc channel → BackendRegistry::reload
//!
//! Shutdown:
//!     broadcast → reload loop and SIGHUP forwarder exit
//! ```
//!
//! # Design Decisions
//! - One update channel, so reloads are applied one at a time
//! - Failed loads never reach the registry
//! - SIGHUP triggers config reload, not shutdown

pub mod reload;
pub mod signals;

pub use reload::{run_reload_loop, ReloadService};
