//! The session directory boundary for Rallypoint.
//!
//! The directory is the remote service that tracks matchmaking sessions:
//! who hosts them, who is on the roster, and the metadata the handoff
//! protocol signals through. Rallypoint does not implement that service —
//! it consumes it through the [`SessionDirectory`] trait:
//!
//! 1. **Trait** ([`SessionDirectory`]) — one async method per remote call
//!    (create, query, join, get, update, remove, heartbeat).
//! 2. **Options** ([`CreateSessionOptions`], [`QueryOptions`], ...) — the
//!    per-call parameter structs.
//! 3. **Errors** ([`DirectoryError`]) — every call can fail; failures carry
//!    a coarse client-side/service-side classification.
//! 4. **Reference backend** ([`MemoryDirectory`]) — a complete in-process
//!    implementation used by tests and demos.
//!
//! # How it fits in the stack
//!
//! ```text
//! Coordinator (above)  ← drives session lifecycle through this trait
//!     ↕
//! Directory boundary (this crate)
//!     ↕
//! Remote directory service (out of scope — HTTP/SDK adapter implements the trait)
//! ```

#![allow(async_fn_in_trait)]

mod directory;
mod error;
mod memory;
mod options;

pub use directory::SessionDirectory;
pub use error::DirectoryError;
pub use memory::{MemoryDirectory, MemoryDirectoryConfig};
pub use options::{
    CreateSessionOptions, JoinOptions, QueryOptions, QueryOrder, UpdatePlayerOptions,
    UpdateSessionOptions,
};
