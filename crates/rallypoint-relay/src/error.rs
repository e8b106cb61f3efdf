//! Error types for the relay boundary.

use rallypoint_protocol::AllocationId;

/// Errors returned by a [`RelayService`](crate::RelayService) implementation.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// No allocation is advertised under the given join code.
    #[error("no relay allocation found for join code {0:?}")]
    InvalidJoinCode(String),

    /// The allocation id is unknown (freed or never created).
    #[error("relay allocation {0} not found")]
    AllocationNotFound(AllocationId),

    /// The allocation has no free peer slots left.
    #[error("relay allocation is at capacity")]
    CapacityExceeded,

    /// The relay service could not be reached or failed internally.
    /// Retrying the whole operation later may succeed.
    #[error("relay unavailable: {0}")]
    Unavailable(String),
}

impl RelayError {
    /// Whether a bare retry of the same request can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
