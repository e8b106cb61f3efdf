//! The connection-approval payload.
//!
//! When a session hands off to a live relay-backed network session, the
//! transport's connection-approval step receives a small JSON document
//! identifying the connecting player. This module owns that document's
//! shape; the transport itself is out of scope.

use serde::{Deserialize, Serialize};

use crate::{Player, ProtocolError};

/// Identity document sent to the transport during connection approval.
///
/// Field names are camelCase on the wire (`playerId`, `playerName`,
/// `playerColor`) — the format the receiving side's approval check parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPayload {
    pub player_id: String,
    pub player_name: String,
    pub player_color: String,
}

impl ConnectionPayload {
    /// Builds the payload from the current roster record of a player.
    pub fn for_player(player: &Player) -> Self {
        Self {
            player_id: player.id.as_str().to_owned(),
            player_name: player.name.clone(),
            player_color: player.color.clone(),
        }
    }

    /// Serializes to the UTF-8 JSON bytes the transport expects.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::EncodePayload(e.to_string()))
    }

    /// Parses a payload received by an approval check.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::InvalidPayload(e.to_string()))
    }
}

// =========================================================================
// Tests
// =========================================================================
