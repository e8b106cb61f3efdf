//! Rallypoint: session coordination for multiplayer matchmaking clients.
//!
//! The heart of the crate is [`SessionCoordinator`]: one per local player,
//! it owns the current session snapshot and drives the whole lifecycle —
//! create, browse, join, periodic poll-and-reconcile, host heartbeats, and
//! the relay handoff that moves everyone from the matchmaking directory
//! into a live game session.
//!
//! The coordinator talks to the outside world through three seams:
//!
//! - [`SessionDirectory`](rallypoint_directory::SessionDirectory) — the
//!   matchmaking service (create/join/query/heartbeat).
//! - [`RelayService`](rallypoint_relay::RelayService) — allocation and
//!   join-code plumbing for the live session.
//! - [`LiveTransport`] — whatever actually carries game traffic once the
//!   handoff completes.
//!
//! In-process backends for the first two ship with their crates, so the
//! full flow runs in tests and demos without any remote service.

mod config;
mod coordinator;
mod driver;
mod error;
mod events;
mod handoff;
mod timer;
mod transport;

pub use config::{Config, Identity};
pub use coordinator::{SessionCoordinator, HEARTBEAT_INTERVAL};
pub use driver::{spawn_driver, DriverHandle};
pub use error::CoordinatorError;
pub use events::{CoordinatorEvent, HandoffRole};
pub use timer::CountdownTimer;
pub use transport::{LiveTransport, TransportError};

pub mod prelude {
    pub use crate::{
        Config, CoordinatorError, CoordinatorEvent, HandoffRole, Identity, LiveTransport,
        SessionCoordinator, TransportError,
    };
    pub use rallypoint_directory::{
        DirectoryError, MemoryDirectory, QueryOptions, SessionDirectory,
    };
    pub use rallypoint_protocol::{Player, PlayerId, Session, SessionId};
    pub use rallypoint_relay::{MemoryRelay, RelayError, RelayService};
    pub use rallypoint_roster::RosterChanges;
}
