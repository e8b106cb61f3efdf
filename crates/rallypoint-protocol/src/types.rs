//! Identity, player, and session types.
//!
//! These are the coordinator's local mirror of what the remote directory
//! stores. The remote record is always authoritative: the coordinator never
//! merges local edits into a snapshot, it replaces the whole value.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, issued by the identity provider.
///
/// Newtype over the provider's opaque string id. Wrapping it keeps a
/// `PlayerId` from being confused with a `SessionId` (both are strings on
/// the wire), and `#[serde(transparent)]` keeps the JSON representation a
/// plain string.
///
/// Player identity is equality on this id only — never on display name or
/// color, both of which can change while a player stays in a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a directory session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a relay allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationId(pub String);

impl AllocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Session metadata keys
// ---------------------------------------------------------------------------

/// Metadata key under which the host publishes the relay join code.
pub const RELAY_JOIN_CODE_KEY: &str = "JoinCode";

/// Sentinel value meaning "no relay has been published yet".
///
/// A session is created with `{ "JoinCode": "0" }`. Only the host may move
/// the value off the sentinel (the directory rejects the update for anyone
/// else), so a non-sentinel value is the signal for peers to hand off.
pub const RELAY_CODE_UNSET: &str = "0";

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A member of a session's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identity, unique across the directory.
    pub id: PlayerId,

    /// Display name. Mutable; never part of identity.
    pub name: String,

    /// Display color key from [`crate::palette::PALETTE`].
    /// Empty means "not assigned yet".
    pub color: String,

    /// Free-form per-player metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Player {
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            metadata: HashMap::new(),
        }
    }

    /// Identity comparison: same player iff same id.
    pub fn same_identity(&self, other: &Player) -> bool {
        self.id == other.id
    }

    /// Whether this player carries a display color.
    pub fn has_color(&self) -> bool {
        !self.color.is_empty()
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A snapshot of a directory-tracked matchmaking session.
///
/// The coordinator caches the most recent snapshot and replaces it wholesale
/// on every successful poll. Roster order is not meaningful; lookups go
/// through [`Session::player`] by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Directory-issued unique id.
    pub id: SessionId,

    /// Human-readable session name.
    pub name: String,

    /// Directory-issued short code others can use to join this session.
    /// Distinct from the relay join code stored in [`Session::metadata`].
    pub join_code: String,

    /// Private sessions are hidden from queries but joinable by code.
    pub is_private: bool,

    /// Maximum roster size, host included.
    pub max_players: u32,

    /// The player with mutation rights over session-level fields.
    pub host_id: PlayerId,

    /// Current roster. Unordered; keyed by player id semantically.
    pub players: Vec<Player>,

    /// Free-form session metadata. Carries the relay join code under
    /// [`RELAY_JOIN_CODE_KEY`] once the host publishes one.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Session {
    /// Looks up a roster member by id.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Whether the given player is on the roster.
    pub fn contains_player(&self, id: &PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// Whether the given player holds host rights.
    pub fn is_host(&self, id: &PlayerId) -> bool {
        &self.host_id == id
    }

    /// Occupancy as displayed to players, e.g. `"2/4"`.
    pub fn occupancy(&self) -> String {
        format!("{}/{}", self.players.len(), self.max_players)
    }

    /// Number of free roster slots.
    pub fn open_slots(&self) -> u32 {
        self.max_players.saturating_sub(self.players.len() as u32)
    }

    /// Whether at least one roster slot is free.
    pub fn has_open_slots(&self) -> bool {
        self.open_slots() > 0
    }

    /// The published relay join code, if any.
    ///
    /// Returns `None` while the metadata entry is missing, empty, or still
    /// the [`RELAY_CODE_UNSET`] sentinel. A `Some` value is the signal that
    /// the host has created a relay and peers should hand off.
    pub fn relay_join_code(&self) -> Option<&str> {
        match self.metadata.get(RELAY_JOIN_CODE_KEY) {
            Some(code) if !code.is_empty() && code != RELAY_CODE_UNSET => Some(code),
            _ => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
