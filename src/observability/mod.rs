//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry construction / reload / config watcher
//!     → tracing events with structured fields (backend, host, url, ...)
//!     → logging.rs subscriber (fmt layer, env filter)
//! ```
//!
//! # Design Decisions
//! - Secrets never appear in events; `Backend` redacts them from `Debug`
//! - Operator mistakes in configuration are `warn`, reload results `info`

pub mod logging;
