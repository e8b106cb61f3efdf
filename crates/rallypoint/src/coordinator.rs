//! The session coordinator.
//!
//! One `SessionCoordinator` per local player. It owns the current session
//! snapshot and drives the lifecycle: create or join a session, poll the
//! directory on a timer and reconcile the roster, heartbeat while hosting,
//! and hand the whole party off to a relay allocation when the game
//! starts (see `handoff.rs` for that half).
//!
//! All mutation goes through `&mut self`, so operations are serialized by
//! construction. The intended setup wraps the coordinator in an async
//! mutex and lets [`spawn_driver`](crate::spawn_driver) call [`tick`]
//! periodically while UI code locks it for the occasional command.
//!
//! [`tick`]: SessionCoordinator::tick

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rallypoint_directory::{
    CreateSessionOptions, JoinOptions, QueryOptions, SessionDirectory, UpdatePlayerOptions,
    UpdateSessionOptions,
};
use rallypoint_protocol::{palette, ConnectionPayload, Player, PlayerId, Session, SessionId};
use rallypoint_relay::{JoinedAllocation, RelayService};
use rallypoint_roster::reconcile;
use tokio::sync::mpsc;

use crate::{
    Config, CoordinatorError, CoordinatorEvent, CountdownTimer, Identity, LiveTransport,
};

/// How often a hosting coordinator signals liveness to the directory.
/// Directory services expire silent sessions on the order of 30s, so
/// half of that with margin.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(14);

/// The joined-session state. Present exactly while the local player is in
/// a directory session.
struct SessionView {
    session: Session,
    last_poll: Instant,
}

/// A relay join whose transport start has not succeeded yet. Kept so a
/// retry reuses the already-held relay slot instead of consuming another.
struct PendingJoin {
    join_code: String,
    allocation: JoinedAllocation,
}

/// Drives one local player through the matchmaking lifecycle.
///
/// Generic over the three boundaries so tests and demos can run the whole
/// flow in-process.
pub struct SessionCoordinator<D, R, T> {
    identity: Identity,
    directory: D,
    relay: R,
    transport: T,
    config: Config,
    view: Option<SessionView>,
    poll_timer: CountdownTimer,
    heartbeat_timer: CountdownTimer,
    poll_in_flight: bool,
    pending_join: Option<PendingJoin>,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
}

impl<D, R, T> SessionCoordinator<D, R, T>
where
    D: SessionDirectory,
    R: RelayService,
    T: LiveTransport,
{
    /// Creates a coordinator and the receiving end of its event stream.
    pub fn new(
        identity: Identity,
        directory: D,
        relay: R,
        transport: T,
        config: Config,
    ) -> (Self, mpsc::UnboundedReceiver<CoordinatorEvent>) {
        let config = config.validated();
        let (events, receiver) = mpsc::unbounded_channel();
        let coordinator = Self {
            identity,
            directory,
            relay,
            transport,
            poll_timer: CountdownTimer::new(config.poll_interval),
            heartbeat_timer: CountdownTimer::new(HEARTBEAT_INTERVAL),
            config,
            view: None,
            poll_in_flight: false,
            pending_join: None,
            events,
        };
        (coordinator, receiver)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The latest session snapshot, if any is joined.
    pub fn current_session(&self) -> Option<&Session> {
        self.view.as_ref().map(|v| &v.session)
    }

    pub fn is_in_session(&self) -> bool {
        self.view.is_some()
    }

    /// Whether the local player hosts the joined session. `false` when no
    /// session is joined.
    pub fn is_host(&self) -> bool {
        self.current_session()
            .is_some_and(|s| s.is_host(&self.identity.player_id))
    }

    /// The local player's roster record in the joined session.
    pub fn local_roster_entry(&self) -> Option<&Player> {
        self.current_session()
            .and_then(|s| s.player(&self.identity.player_id))
    }

    /// A roster member's color key, by id.
    pub fn player_color(&self, id: &PlayerId) -> Option<&str> {
        self.current_session()
            .and_then(|s| s.player(id))
            .map(|p| p.color.as_str())
    }

    /// When the snapshot was last refreshed from the directory. Also set
    /// on entry (create/join), since the join response is a fresh
    /// snapshot.
    pub fn last_poll(&self) -> Option<Instant> {
        self.view.as_ref().map(|v| v.last_poll)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Creates a new session with the local player as host and joins it.
    ///
    /// The relay join-code metadata is seeded with the unset sentinel so
    /// clients always find the key present and can watch it for a real
    /// code.
    pub async fn create_session(
        &mut self,
        name: &str,
        max_players: u32,
        is_private: bool,
    ) -> Result<Session, CoordinatorError> {
        if name.trim().is_empty() {
            return Err(CoordinatorError::InvalidInput(
                "session name must not be blank".to_owned(),
            ));
        }
        if max_players < 2 {
            return Err(CoordinatorError::InvalidInput(format!(
                "max_players must be at least 2, got {max_players}"
            )));
        }

        let options = CreateSessionOptions {
            is_private,
            host_player: self.fresh_local_player(),
            metadata: HashMap::from([(
                rallypoint_protocol::RELAY_JOIN_CODE_KEY.to_owned(),
                rallypoint_protocol::RELAY_CODE_UNSET.to_owned(),
            )]),
        };
        let session = self.directory.create_session(name, max_players, options).await?;

        tracing::info!(
            session_id = %session.id,
            name,
            max_players,
            is_private,
            "session created"
        );
        self.install_view(session.clone());
        Ok(session)
    }

    /// Lists up to `max_results` joinable sessions, newest first.
    /// Read-only; works whether or not a session is currently joined.
    pub async fn search_sessions(
        &self,
        max_results: usize,
    ) -> Result<Vec<Session>, CoordinatorError> {
        let sessions = self
            .directory
            .query_sessions(QueryOptions::with_count(max_results))
            .await?;
        tracing::debug!(found = sessions.len(), "session search completed");
        Ok(sessions)
    }

    /// Joins a session by its short join code.
    pub async fn join_by_code(&mut self, code: &str) -> Result<Session, CoordinatorError> {
        if code.trim().is_empty() {
            return Err(CoordinatorError::InvalidInput(
                "join code must not be blank".to_owned(),
            ));
        }
        let options = JoinOptions {
            player: self.fresh_local_player(),
        };
        let session = self.directory.join_by_code(code, options).await?;
        tracing::info!(session_id = %session.id, code, "joined session by code");
        self.install_view(session.clone());
        Ok(session)
    }

    /// Joins a session by id, e.g. one picked from [`search_sessions`].
    ///
    /// [`search_sessions`]: SessionCoordinator::search_sessions
    pub async fn join_by_id(&mut self, id: &SessionId) -> Result<Session, CoordinatorError> {
        if id.as_str().trim().is_empty() {
            return Err(CoordinatorError::InvalidInput(
                "session id must not be blank".to_owned(),
            ));
        }
        let options = JoinOptions {
            player: self.fresh_local_player(),
        };
        let session = self.directory.join_by_id(id, options).await?;
        tracing::info!(session_id = %session.id, "joined session by id");
        self.install_view(session.clone());
        Ok(session)
    }

    /// Leaves the joined session.
    ///
    /// Idempotent: with no session joined this succeeds without touching
    /// the directory. Local state is cleared *before* the remote removal,
    /// so even a failed removal leaves the coordinator out of the session;
    /// the directory's liveness expiry cleans up the remote side
    /// eventually.
    pub async fn leave_session(&mut self) -> Result<(), CoordinatorError> {
        let Some(view) = self.view.take() else {
            tracing::debug!("leave requested with no session joined, nothing to do");
            return Ok(());
        };
        self.poll_in_flight = false;
        self.pending_join = None;

        let session_id = view.session.id;
        if let Err(error) = self
            .directory
            .remove_player(&session_id, &self.identity.player_id)
            .await
        {
            tracing::warn!(%session_id, %error, "failed to leave session remotely, local state cleared anyway");
            return Err(error.into());
        }
        tracing::info!(%session_id, "left session");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Player and session updates
    // -----------------------------------------------------------------------

    /// Advances the local player's color one step through the palette and
    /// pushes it to the directory. Collisions with other members are
    /// allowed.
    pub async fn cycle_color(&mut self) -> Result<Session, CoordinatorError> {
        let Some(view) = &self.view else {
            return Err(CoordinatorError::NotInSession);
        };
        let current = view
            .session
            .player(&self.identity.player_id)
            .map(|p| p.color.clone())
            .unwrap_or_default();
        let next = palette::next_key(&current).to_owned();

        let session = self
            .directory
            .update_player(
                &view.session.id,
                &self.identity.player_id,
                UpdatePlayerOptions {
                    color: Some(next.clone()),
                    ..UpdatePlayerOptions::default()
                },
            )
            .await?;
        tracing::debug!(from = %current, to = %next, "color cycled");
        self.replace_snapshot(session.clone());
        Ok(session)
    }

    /// Changes the local player's display name, in the directory and in
    /// the identity used for future joins.
    pub async fn set_display_name(&mut self, name: &str) -> Result<(), CoordinatorError> {
        if name.trim().is_empty() {
            return Err(CoordinatorError::InvalidInput(
                "display name must not be blank".to_owned(),
            ));
        }
        if let Some(view) = &self.view {
            let session = self
                .directory
                .update_player(
                    &view.session.id,
                    &self.identity.player_id,
                    UpdatePlayerOptions {
                        name: Some(name.to_owned()),
                        ..UpdatePlayerOptions::default()
                    },
                )
                .await?;
            self.replace_snapshot(session);
        }
        self.identity.display_name = name.to_owned();
        Ok(())
    }

    /// Host-only: changes session visibility and capacity.
    pub async fn update_session_options(
        &mut self,
        is_private: Option<bool>,
        max_players: Option<u32>,
    ) -> Result<Session, CoordinatorError> {
        let Some(view) = &self.view else {
            return Err(CoordinatorError::NotInSession);
        };
        // Pre-check saves the round trip; the directory's check is binding.
        if !view.session.is_host(&self.identity.player_id) {
            return Err(CoordinatorError::NotHost);
        }
        if let Some(max) = max_players {
            if max < 2 {
                return Err(CoordinatorError::InvalidInput(format!(
                    "max_players must be at least 2, got {max}"
                )));
            }
        }

        let session = self
            .directory
            .update_session(
                &view.session.id,
                &self.identity.player_id,
                UpdateSessionOptions {
                    is_private,
                    max_players,
                    metadata: None,
                },
            )
            .await?;
        self.replace_snapshot(session.clone());
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Periodic work
    // -----------------------------------------------------------------------

    /// Advances the coordinator's timers by `elapsed` and performs whatever
    /// periodic work came due: host heartbeat, then session poll. Does
    /// nothing while no session is joined.
    ///
    /// Failures of periodic work are logged and swallowed; the next
    /// interval retries. `tick` itself never fails.
    pub async fn tick(&mut self, elapsed: Duration) {
        self.tick_heartbeat(elapsed).await;
        self.tick_poll(elapsed).await;
    }

    async fn tick_heartbeat(&mut self, elapsed: Duration) {
        let Some(view) = &self.view else { return };
        // Only the host heartbeats; the timer doesn't even advance for
        // clients, so a promoted host starts from a full interval.
        if !view.session.is_host(&self.identity.player_id) {
            return;
        }
        if !self.heartbeat_timer.tick(elapsed) {
            return;
        }

        let session_id = view.session.id.clone();
        match self.directory.send_heartbeat(&session_id).await {
            Ok(()) => tracing::debug!(%session_id, "heartbeat sent"),
            Err(error) => {
                tracing::warn!(%session_id, %error, "heartbeat failed, retrying next interval");
            }
        }
    }

    async fn tick_poll(&mut self, elapsed: Duration) {
        if self.view.is_none() {
            return;
        }
        if !self.poll_timer.tick(elapsed) {
            return;
        }
        if self.poll_in_flight {
            tracing::debug!("previous poll still in flight, skipping this interval");
            return;
        }
        self.poll_in_flight = true;
        self.poll_once().await;
        self.poll_in_flight = false;
    }

    /// One poll: fetch the authoritative snapshot, replace the local one,
    /// reconcile rosters, and run the client half of the relay handoff if
    /// a join code has been published.
    async fn poll_once(&mut self) {
        let Some(view) = &self.view else { return };
        let session_id = view.session.id.clone();

        let session = match self.directory.get_session(&session_id).await {
            Ok(session) => session,
            Err(error) => {
                // Keep the stale snapshot; staleness is visible, a
                // disappearing roster is a lie.
                tracing::warn!(%session_id, %error, "poll failed, keeping stale snapshot");
                return;
            }
        };

        // The view may have been cleared or replaced while the fetch was
        // in flight; a late response must not resurrect a left session.
        let Some(view) = self.view.as_mut() else { return };
        if view.session.id != session_id {
            return;
        }

        let previous = std::mem::replace(&mut view.session, session.clone());
        view.last_poll = Instant::now();
        let changes = reconcile(&previous.players, &session.players);

        self.emit(CoordinatorEvent::SessionUpdated(session.clone()));
        if changes.has_membership_changes() {
            tracing::info!(
                %session_id,
                added = changes.added.len(),
                removed = changes.removed.len(),
                "roster changed"
            );
            self.emit(CoordinatorEvent::RosterChanged(changes));
        }

        if let Some(code) = session.relay_join_code() {
            let code = code.to_owned();
            self.complete_client_handoff(&code).await;
        }
    }

    // -----------------------------------------------------------------------
    // Internals (shared with handoff.rs)
    // -----------------------------------------------------------------------

    pub(crate) fn directory(&self) -> &D {
        &self.directory
    }

    pub(crate) fn relay(&self) -> &R {
        &self.relay
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn emit(&self, event: CoordinatorEvent) {
        // Best-effort: nobody listening is fine.
        let _ = self.events.send(event);
    }

    /// The allocation from a prior join attempt for the same code, if its
    /// transport start is still outstanding.
    pub(crate) fn held_relay_slot(&self, join_code: &str) -> Option<JoinedAllocation> {
        self.pending_join
            .as_ref()
            .filter(|p| p.join_code == join_code)
            .map(|p| p.allocation.clone())
    }

    pub(crate) fn hold_relay_slot(&mut self, join_code: &str, allocation: JoinedAllocation) {
        self.pending_join = Some(PendingJoin {
            join_code: join_code.to_owned(),
            allocation,
        });
    }

    pub(crate) fn release_relay_slot(&mut self) {
        self.pending_join = None;
    }

    /// The payload handed to the transport on handoff. Prefers the roster
    /// record (which carries the directory-assigned color) over the bare
    /// identity.
    pub(crate) fn connection_payload(&self) -> ConnectionPayload {
        match self.local_roster_entry() {
            Some(player) => ConnectionPayload::for_player(player),
            None => ConnectionPayload::for_player(&self.fresh_local_player()),
        }
    }

    /// A new roster record for the local player, used when entering a
    /// session. Color starts as a random palette key; the directory-side
    /// record is authoritative afterwards.
    fn fresh_local_player(&self) -> Player {
        Player::new(
            self.identity.player_id.clone(),
            self.identity.display_name.clone(),
            palette::random_key(),
        )
    }

    fn install_view(&mut self, session: Session) {
        self.poll_timer.reset();
        self.heartbeat_timer.reset();
        self.poll_in_flight = false;
        self.pending_join = None;
        self.view = Some(SessionView {
            session,
            last_poll: Instant::now(),
        });
    }

    fn replace_snapshot(&mut self, session: Session) {
        if let Some(view) = self.view.as_mut() {
            view.session = session;
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
