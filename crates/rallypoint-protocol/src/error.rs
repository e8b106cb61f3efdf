//! Error types for the protocol layer.

/// Errors from encoding or decoding protocol documents.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A connection payload could not be serialized.
    #[error("failed to encode connection payload: {0}")]
    EncodePayload(String),

    /// Received bytes that are not a valid connection payload.
    #[error("invalid connection payload: {0}")]
    InvalidPayload(String),
}
