//! The coordinator's error type.

use rallypoint_directory::DirectoryError;
use rallypoint_relay::RelayError;

use crate::transport::TransportError;

/// Anything a coordinator operation can fail with.
///
/// The first three variants are caught locally, before any remote call.
/// The rest wrap the underlying boundary errors unchanged, so callers can
/// still match on the precise directory or relay failure.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no session is currently joined")]
    NotInSession,

    #[error("only the session host may perform this operation")]
    NotHost,

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CoordinatorError {
    /// Whether retrying the same operation unchanged could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoordinatorError::Directory(e) => e.is_retryable(),
            CoordinatorError::Relay(e) => e.is_retryable(),
            _ => false,
        }
    }
}
