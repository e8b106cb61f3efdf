//! The live-transport seam.
//!
//! Once the relay handoff completes, some transport layer has to start
//! carrying actual game traffic. That layer lives outside this crate; the
//! coordinator only needs to hand it the allocation material and the
//! local player's connection payload.

use rallypoint_protocol::ConnectionPayload;
use rallypoint_relay::{HostAllocation, JoinedAllocation};

/// Starts the live session on top of a relay allocation.
pub trait LiveTransport: Send + Sync + 'static {
    /// Begin hosting. Called with the host's own allocation.
    fn start_host(
        &self,
        allocation: &HostAllocation,
        payload: ConnectionPayload,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Begin as a client on an allocation joined by code.
    fn start_client(
        &self,
        allocation: &JoinedAllocation,
        payload: ConnectionPayload,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport failed to start: {0}")]
    StartFailed(String),
}
