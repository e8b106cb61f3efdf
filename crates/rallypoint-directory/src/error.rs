//! Error types for the directory boundary.

use rallypoint_protocol::{PlayerId, SessionId};

/// Errors returned by a [`SessionDirectory`](crate::SessionDirectory)
/// implementation.
///
/// The variants carry a coarse classification: [`Unavailable`] is a
/// service-side problem worth retrying later; everything else describes a
/// problem with the request itself and will not succeed on a bare retry.
///
/// [`Unavailable`]: DirectoryError::Unavailable
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// No session exists with the given id (expired, deleted, or never
    /// created).
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// No session is advertised under the given join code.
    #[error("no session found for join code {0:?}")]
    InvalidJoinCode(String),

    /// The session's roster is at capacity.
    #[error("session {0} is full")]
    SessionFull(SessionId),

    /// A host-only mutation was attempted by a non-host. Not retryable
    /// without a privilege change.
    #[error("player {0} is not the host of this session")]
    NotHost(PlayerId),

    /// The service rejected the request (client-side problem: malformed
    /// input, duplicate join, capacity rule, ...).
    #[error("directory rejected the request: {0}")]
    Rejected(String),

    /// The service could not be reached or failed internally (service-side
    /// problem). Retrying the whole operation later may succeed.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

impl DirectoryError {
    /// Whether a bare retry of the same request can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
