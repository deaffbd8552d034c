//! Signaling wire protocol.
//!
//! # Data Flow
//! ```text
//! Client frame (JSON)
//!     → client.rs (envelope → typed ClientMessage, validation)
//!     → business logic (sessions, rooms: external)
//!     → server.rs (typed ServerMessage → JSON envelope)
//!     → transport asks close_after_send / is_chat_refresh / ...
//! ```
//!
//! # Design Decisions
//! - Every message is `{id?, type, <type>: {...}}` on the wire
//! - In memory the payload is an enum; a message cannot carry two payloads
//! - Unknown client types decode to `ClientPayload::Other` and are not rejected here
//! - Opaque data stays raw JSON until a predicate needs to peek into it

pub mod client;
pub mod error;
pub mod event;
pub mod server;

pub use client::{ClientMessage, ClientPayload, DecodeError, HelloAuth, HELLO_VERSION};
pub use error::{Error, ValidationError};
pub use event::EventServerMessage;
pub use server::{ServerMessage, ServerPayload, SessionContext};
