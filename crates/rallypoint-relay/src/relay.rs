//! The relay client trait and allocation descriptors.

use rallypoint_protocol::AllocationId;

use crate::RelayError;

// ---------------------------------------------------------------------------
// Allocation descriptors
// ---------------------------------------------------------------------------

/// Connection material for the peer that *created* an allocation.
///
/// The byte fields are opaque to Rallypoint — they are produced by the relay
/// service and consumed verbatim by the network transport. The host hands
/// this descriptor straight to the transport; it never needs to resolve its
/// own join code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAllocation {
    pub allocation_id: AllocationId,
    pub server_address: String,
    pub server_port: u16,
    pub allocation_id_bytes: Vec<u8>,
    pub key: Vec<u8>,
    pub connection_data: Vec<u8>,
}

/// Connection material for a peer that *joined* an allocation by code.
///
/// Same shape as [`HostAllocation`] plus the host's connection data, which
/// the transport needs to address the hosting peer through the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedAllocation {
    pub server_address: String,
    pub server_port: u16,
    pub allocation_id_bytes: Vec<u8>,
    pub key: Vec<u8>,
    pub connection_data: Vec<u8>,
    pub host_connection_data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Client for a relay allocation service.
///
/// Same boundary pattern as the directory client: adapters over the hosted
/// service implement this trait, and so does the in-process
/// [`MemoryRelay`](crate::MemoryRelay) used in tests.
pub trait RelayService: Send + Sync + 'static {
    /// Allocates a rendezvous point sized for `max_connections` joining
    /// peers (the creating host is not counted).
    fn create_allocation(
        &self,
        max_connections: u32,
    ) -> impl std::future::Future<Output = Result<HostAllocation, RelayError>> + Send;

    /// Obtains the shareable join code for an allocation.
    fn get_join_code(
        &self,
        allocation_id: &AllocationId,
    ) -> impl std::future::Future<Output = Result<String, RelayError>> + Send;

    /// Resolves a join code into connection material for a joining peer.
    fn join_allocation(
        &self,
        join_code: &str,
    ) -> impl std::future::Future<Output = Result<JoinedAllocation, RelayError>> + Send;
}
