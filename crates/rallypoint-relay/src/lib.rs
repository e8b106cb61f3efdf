//! The relay boundary for Rallypoint.
//!
//! A relay is a server-brokered rendezvous point: the host allocates one,
//! publishes its join code through the session directory, and every peer
//! resolves the code into connection parameters — nobody needs a directly
//! reachable address. Rallypoint consumes the relay through the
//! [`RelayService`] trait:
//!
//! 1. **Trait** ([`RelayService`]) — allocate, fetch join code, join by code.
//! 2. **Descriptors** ([`HostAllocation`], [`JoinedAllocation`]) — the
//!    opaque connection material handed to the network transport.
//! 3. **Errors** ([`RelayError`]).
//! 4. **Reference backend** ([`MemoryRelay`]) — in-process implementation
//!    for tests and demos.

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod relay;

pub use error::RelayError;
pub use memory::MemoryRelay;
pub use relay::{HostAllocation, JoinedAllocation, RelayService};
