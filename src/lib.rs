//! Signaling core: the client/server wire protocol and the backend registry
//! that decides which tenant secret authorizes a callback URL.
//!
//! # Architecture Overview
//!
//! ```text
//!   inbound frame ──▶ protocol::client ──▶ (sessions, rooms: external)
//!                         │                        │
//!                         │ hello auth url         ▼
//!                         ▼                 protocol::server ──▶ outbound frame
//!                   backends::registry
//!                         ▲
//!   config file ──▶ config ──▶ lifecycle::reload (watcher, SIGHUP)
//! ```

pub mod backends;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod protocol;

pub use backends::{Backend, BackendRegistry, ReloadOutcome};
pub use config::{ConfigSnapshot, ConfigSource};
pub use protocol::{ClientMessage, ServerMessage};
