//! Events emitted by the coordinator.
//!
//! Delivery is best-effort over an unbounded channel: a dropped receiver
//! never stalls or fails coordinator operations.

use rallypoint_protocol::Session;
use rallypoint_roster::RosterChanges;

/// Which side of the relay handoff the local player ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffRole {
    Host,
    Client,
}

impl std::fmt::Display for HandoffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandoffRole::Host => write!(f, "host"),
            HandoffRole::Client => write!(f, "client"),
        }
    }
}

/// What the coordinator tells the rest of the application.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// A poll replaced the session snapshot. Fires on every successful
    /// poll, whether or not anything changed.
    SessionUpdated(Session),

    /// Membership changed between the previous snapshot and this one.
    RosterChanged(RosterChanges),

    /// The relay handoff completed and the local player is in the live
    /// session. The directory session has been (or is being) left.
    LiveSessionEntered { role: HandoffRole },

    /// A client-side handoff attempt failed. The player stays in the
    /// directory session; the next poll retries.
    HandoffFailed { reason: String },
}
