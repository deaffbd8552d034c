//! Backend (tenant) registry.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ConfigSource
//!     → hosts.rs (ids, urls, secrets → Backend, grouped by host)
//!     → registry.rs (BackendRegistry, one of three modes)
//!
//! Request authorization:
//!     origin URL → host key → ordered entries → first prefix match → secret
//!
//! Reload:
//!     new ConfigSource → reload.rs (diff against current table) → atomic swap
//! ```
//!
//! # Modes
//! - allow-all: every host resolves to one compat backend (development only)
//! - explicit: per-tenant url + secret, several tenants per host told apart by path
//! - legacy: list of hostnames sharing one compat backend

pub mod backend;
pub mod hosts;
pub mod registry;
pub mod reload;

pub use backend::Backend;
pub use hosts::HostTable;
pub use registry::BackendRegistry;
pub use reload::{ReloadOutcome, ReloadSummary};
