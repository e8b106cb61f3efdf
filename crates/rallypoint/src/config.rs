//! Coordinator configuration.

use std::time::Duration;

/// Who the local player is. Fixed for the coordinator's lifetime; the
/// display name can be changed later through the coordinator, which
/// pushes it to the directory rather than mutating this struct.
#[derive(Debug, Clone)]
pub struct Identity {
    pub player_id: rallypoint_protocol::PlayerId,
    pub display_name: String,
}

impl Identity {
    pub fn new(player_id: impl Into<rallypoint_protocol::PlayerId>, display_name: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct Config {
    /// How often the joined session is re-fetched from the directory.
    /// Directory services rate-limit reads, so this should stay coarse.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl Config {
    /// Returns a sanitized copy, warning about out-of-range values.
    pub fn validated(self) -> Self {
        let mut config = self;
        if config.poll_interval < Duration::from_millis(500) {
            tracing::warn!(
                poll_interval_ms = config.poll_interval.as_millis() as u64,
                "poll_interval below 500ms would trip directory rate limits, clamping"
            );
            config.poll_interval = Duration::from_millis(500);
        }
        config
    }
}
