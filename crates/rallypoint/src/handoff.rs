//! The relay handoff protocol.
//!
//! The directory session carries a `JoinCode` metadata entry that starts
//! as the unset sentinel. When the host starts the game it creates a
//! relay allocation, fetches its join code, and publishes it over the
//! sentinel; every client's next poll sees a real code, joins the
//! allocation, starts its transport, and leaves the directory session.
//! The host does the same locally, so the directory session empties out
//! and expires while the party plays over the relay.

use rallypoint_directory::{SessionDirectory, UpdateSessionOptions};
use rallypoint_protocol::RELAY_JOIN_CODE_KEY;
use rallypoint_relay::RelayService;

use crate::{
    CoordinatorError, CoordinatorEvent, HandoffRole, LiveTransport, SessionCoordinator,
};

impl<D, R, T> SessionCoordinator<D, R, T>
where
    D: SessionDirectory,
    R: RelayService,
    T: LiveTransport,
{
    /// Host-only: moves the whole party into a live relay session.
    ///
    /// Allocates relay capacity for every non-host member, fetches the
    /// join code, starts the host transport, publishes the code to the
    /// session metadata, then leaves the directory session. An error at
    /// any step before the publish leaves the session untouched (code
    /// still the sentinel, host still in the session) so the host can
    /// simply retry.
    pub async fn start_game(&mut self) -> Result<(), CoordinatorError> {
        let Some(session) = self.current_session() else {
            return Err(CoordinatorError::NotInSession);
        };
        if !session.is_host(&self.identity().player_id) {
            return Err(CoordinatorError::NotHost);
        }

        let session_id = session.id.clone();
        let local_id = self.identity().player_id.clone();
        // The host holds one slot itself.
        let max_connections = session.max_players.saturating_sub(1).max(1);

        let allocation = self.relay().create_allocation(max_connections).await?;
        let join_code = self.relay().get_join_code(&allocation.allocation_id).await?;

        let payload = self.connection_payload();
        self.transport().start_host(&allocation, payload).await?;

        // Publishing is the commit point: once the code is visible,
        // clients start migrating.
        self.directory()
            .update_session(
                &session_id,
                &local_id,
                UpdateSessionOptions::metadata_entry(RELAY_JOIN_CODE_KEY, join_code.clone()),
            )
            .await?;

        tracing::info!(%session_id, %join_code, "relay join code published, entering live session as host");
        self.emit(CoordinatorEvent::LiveSessionEntered {
            role: HandoffRole::Host,
        });

        // The directory session has served its purpose for the host.
        // Leaving may fail remotely; liveness expiry cleans that up.
        if let Err(error) = self.leave_session().await {
            tracing::warn!(%session_id, %error, "failed to leave directory session after handoff");
        }
        Ok(())
    }

    /// Client half of the handoff, invoked from the poll loop when a
    /// published join code is detected.
    ///
    /// On success the client is in the live session and leaves the
    /// directory session. On failure it stays, emits
    /// [`CoordinatorEvent::HandoffFailed`], and the next poll retries.
    pub(crate) async fn complete_client_handoff(&mut self, join_code: &str) {
        match self.join_relay(join_code).await {
            Ok(()) => {
                tracing::info!(join_code, "relay handoff completed, entering live session as client");
                self.emit(CoordinatorEvent::LiveSessionEntered {
                    role: HandoffRole::Client,
                });
                if let Err(error) = self.leave_session().await {
                    tracing::warn!(%error, "failed to leave directory session after handoff");
                }
            }
            Err(error) => {
                tracing::warn!(join_code, %error, "relay handoff failed, staying in session");
                self.emit(CoordinatorEvent::HandoffFailed {
                    reason: error.to_string(),
                });
            }
        }
    }

    async fn join_relay(&mut self, join_code: &str) -> Result<(), CoordinatorError> {
        let payload = self.connection_payload();
        // A prior attempt may have joined the allocation and then failed
        // to start the transport. That slot is still ours; joining again
        // would consume another one per retry until the allocation fills.
        let allocation = match self.held_relay_slot(join_code) {
            Some(allocation) => allocation,
            None => {
                let allocation = self.relay().join_allocation(join_code).await?;
                self.hold_relay_slot(join_code, allocation.clone());
                allocation
            }
        };
        self.transport().start_client(&allocation, payload).await?;
        self.release_relay_slot();
        Ok(())
    }
}
