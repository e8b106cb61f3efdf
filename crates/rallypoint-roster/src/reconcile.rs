//! The reconcile operation.

use std::collections::HashSet;

use rallypoint_protocol::{palette, Player, PlayerId};

/// The outcome of diffing two roster snapshots.
///
/// Identity is by player id throughout — a renamed or recolored player is
/// `kept`, not removed-and-added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterChanges {
    /// Present in the new snapshot, absent from the previous one.
    /// Members without a color key have one assigned.
    pub added: Vec<Player>,

    /// Present in the previous snapshot, absent from the new one.
    pub removed: Vec<Player>,

    /// Present in both, carried through with the *new* snapshot's
    /// attributes — the remote record is authoritative, local state is
    /// never merged back in.
    pub kept: Vec<Player>,
}

impl RosterChanges {
    /// Whether membership changed (someone joined or left). Attribute
    /// changes on kept players don't count.
    pub fn has_membership_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Diffs `previous` against `current` by player id.
///
/// An added player arriving without a color key gets one assigned: cycling
/// one step forward from whatever key the snapshot carried, which for an
/// unknown or empty key falls through to a pseudo-random pick. Assignment
/// is per-player and deliberately uncoordinated — two players may share a
/// key.
pub fn reconcile(previous: &[Player], current: &[Player]) -> RosterChanges {
    let previous_ids: HashSet<&PlayerId> = previous.iter().map(|p| &p.id).collect();
    let current_ids: HashSet<&PlayerId> = current.iter().map(|p| &p.id).collect();

    let mut changes = RosterChanges::default();

    for player in previous {
        if !current_ids.contains(&player.id) {
            changes.removed.push(player.clone());
        }
    }

    for player in current {
        if previous_ids.contains(&player.id) {
            changes.kept.push(player.clone());
        } else {
            let mut joined = player.clone();
            if !joined.has_color() {
                joined.color = palette::next_key(&joined.color).to_owned();
            }
            changes.added.push(joined);
        }
    }

    changes
}

// =========================================================================
// Tests
// =========================================================================
