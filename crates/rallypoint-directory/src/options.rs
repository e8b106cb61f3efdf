//! Per-call option structs for the directory client.
//!
//! Each remote call takes a small options struct rather than a long
//! positional parameter list, mirroring the shape of the hosted service's
//! API. Optional fields mean "leave unchanged" on updates.

use std::collections::HashMap;

use rallypoint_protocol::Player;

// ---------------------------------------------------------------------------
// Create / join
// ---------------------------------------------------------------------------

/// Options for [`SessionDirectory::create_session`](crate::SessionDirectory::create_session).
#[derive(Debug, Clone)]
pub struct CreateSessionOptions {
    /// Private sessions are hidden from queries but joinable by code.
    pub is_private: bool,

    /// The caller's player record. The directory installs it as the host
    /// and first roster member.
    pub host_player: Player,

    /// Initial session metadata. The coordinator seeds the relay join-code
    /// sentinel here.
    pub metadata: HashMap<String, String>,
}

/// Options for the join-by-code and join-by-id calls.
#[derive(Debug, Clone)]
pub struct JoinOptions {
    /// The caller's player record, appended to the roster on success.
    pub player: Player,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Result ordering for [`QueryOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOrder {
    /// Most recently created sessions first. The matchmaking default:
    /// fresh sessions are the ones most likely to have space and a
    /// present host.
    #[default]
    NewestFirst,

    /// Oldest sessions first.
    OldestFirst,
}

/// Options for [`SessionDirectory::query_sessions`](crate::SessionDirectory::query_sessions).
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Maximum number of results to return.
    pub count: usize,

    /// Result ordering.
    pub order: QueryOrder,

    /// When set, only sessions with at least this many free roster slots
    /// are returned.
    pub min_open_slots: Option<u32>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            count: 25,
            order: QueryOrder::default(),
            min_open_slots: None,
        }
    }
}

impl QueryOptions {
    /// A query capped at `count` results with the default ordering.
    pub fn with_count(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Options for the host-only session update. `None` fields are left
/// untouched; metadata entries are merged key-by-key over the existing map.
#[derive(Debug, Clone, Default)]
pub struct UpdateSessionOptions {
    pub is_private: Option<bool>,
    pub max_players: Option<u32>,
    pub metadata: Option<HashMap<String, String>>,
}

impl UpdateSessionOptions {
    /// An update that only writes one metadata entry.
    pub fn metadata_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metadata: Some(HashMap::from([(key.into(), value.into())])),
            ..Self::default()
        }
    }
}

/// Options for a player's self-update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdatePlayerOptions {
    pub name: Option<String>,
    pub color: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}
