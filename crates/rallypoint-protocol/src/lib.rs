//! Core data model for Rallypoint.
//!
//! This crate defines the types that every other layer speaks:
//!
//! - **Identity** ([`PlayerId`], [`SessionId`], [`AllocationId`]) — opaque
//!   string identifiers issued by the remote services.
//! - **Sessions and players** ([`Session`], [`Player`]) — the local copy of
//!   a directory-tracked matchmaking session and its roster.
//! - **Colors** ([`palette`]) — the fixed display palette and the cycling
//!   assignment rules.
//! - **Payloads** ([`ConnectionPayload`]) — the serialized document the
//!   network transport's connection-approval step receives during handoff.
//!
//! # Architecture
//!
//! The protocol layer has no I/O and no async. It sits below the directory
//! and relay boundaries, which exchange these types with remote services,
//! and below the coordinator, which caches them locally.
//!
//! ```text
//! Coordinator (state machine) → Directory / Relay (remote calls) → Protocol (types)
//! ```

mod error;
pub mod palette;
mod payload;
mod types;

pub use error::ProtocolError;
pub use payload::ConnectionPayload;
pub use types::{
    AllocationId, Player, PlayerId, Session, SessionId, RELAY_CODE_UNSET,
    RELAY_JOIN_CODE_KEY,
};
