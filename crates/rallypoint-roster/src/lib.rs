//! Roster reconciliation for Rallypoint.
//!
//! Each poll replaces the local session snapshot with the remote one. This
//! crate answers the question that replacement raises: *who joined, who
//! left, who stayed?* [`reconcile`] diffs two roster snapshots by player
//! identity and reports the facts; it has no side effects. Reacting to the
//! diff (sounds, widgets, logs) is the caller's business.

mod reconcile;

pub use reconcile::{reconcile, RosterChanges};
