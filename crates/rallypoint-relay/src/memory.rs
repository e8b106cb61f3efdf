//! An in-process relay backend.
//!
//! `MemoryRelay` hands out fake-but-consistent connection material: every
//! allocation gets a distinct id, key, and join code, and joining by code
//! returns byte fields that match what the host received. Enough for tests
//! and demos to drive the full handoff protocol without a relay server.
//!
//! Clones share the same allocation table, like clones of the directory
//! backend share a registry.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use rallypoint_protocol::AllocationId;
use tokio::sync::Mutex;

use crate::{HostAllocation, JoinedAllocation, RelayError};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

struct Allocation {
    host: HostAllocation,
    join_code: String,
    max_connections: u32,
    joined: u32,
}

#[derive(Default)]
struct Table {
    allocations: HashMap<AllocationId, Allocation>,
    codes: HashMap<String, AllocationId>,
}

/// In-process [`RelayService`](crate::RelayService) implementation.
#[derive(Clone, Default)]
pub struct MemoryRelay {
    table: Arc<Mutex<Table>>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live allocations.
    pub async fn len(&self) -> usize {
        self.table.lock().await.allocations.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.allocations.is_empty()
    }
}

impl crate::RelayService for MemoryRelay {
    async fn create_allocation(
        &self,
        max_connections: u32,
    ) -> Result<HostAllocation, RelayError> {
        // ThreadRng is not Send; keep it scoped out before the lock await.
        let (id_bytes, key, connection_data, port, join_code) = {
            let mut rng = rand::rng();
            let id_bytes: [u8; 16] = rng.random();
            let key: [u8; 16] = rng.random();
            let connection_data: [u8; 8] = rng.random();
            let port: u16 = rng.random_range(30000..60000);
            let join_code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            (id_bytes, key, connection_data, port, join_code)
        };

        let allocation_id = AllocationId::new(
            id_bytes.iter().map(|b| format!("{b:02x}")).collect::<String>(),
        );

        let host = HostAllocation {
            allocation_id: allocation_id.clone(),
            server_address: "127.0.0.1".to_owned(),
            server_port: port,
            allocation_id_bytes: id_bytes.to_vec(),
            key: key.to_vec(),
            connection_data: connection_data.to_vec(),
        };

        let mut table = self.table.lock().await;
        table.codes.insert(join_code.clone(), allocation_id.clone());
        table.allocations.insert(
            allocation_id.clone(),
            Allocation {
                host: host.clone(),
                join_code,
                max_connections,
                joined: 0,
            },
        );

        tracing::info!(%allocation_id, max_connections, "relay allocation created");
        Ok(host)
    }

    async fn get_join_code(&self, allocation_id: &AllocationId) -> Result<String, RelayError> {
        let table = self.table.lock().await;
        table
            .allocations
            .get(allocation_id)
            .map(|a| a.join_code.clone())
            .ok_or_else(|| RelayError::AllocationNotFound(allocation_id.clone()))
    }

    async fn join_allocation(&self, join_code: &str) -> Result<JoinedAllocation, RelayError> {
        let normalized = join_code.trim().to_uppercase();
        let mut table = self.table.lock().await;

        let allocation_id = table
            .codes
            .get(&normalized)
            .cloned()
            .ok_or_else(|| RelayError::InvalidJoinCode(join_code.to_owned()))?;
        let allocation = table
            .allocations
            .get_mut(&allocation_id)
            .ok_or_else(|| RelayError::InvalidJoinCode(join_code.to_owned()))?;

        if allocation.joined >= allocation.max_connections {
            return Err(RelayError::CapacityExceeded);
        }
        allocation.joined += 1;

        // The joining peer gets its own connection data but shares the
        // allocation's addressing material with the host.
        let peer_connection_data: [u8; 8] = rand::rng().random();

        tracing::info!(%allocation_id, joined = allocation.joined, "peer joined relay allocation");
        Ok(JoinedAllocation {
            server_address: allocation.host.server_address.clone(),
            server_port: allocation.host.server_port,
            allocation_id_bytes: allocation.host.allocation_id_bytes.clone(),
            key: allocation.host.key.clone(),
            connection_data: peer_connection_data.to_vec(),
            host_connection_data: allocation.host.connection_data.clone(),
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
