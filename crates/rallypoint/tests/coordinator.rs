//! End-to-end coordinator tests over the in-process backends.
//!
//! The doubles here wrap `MemoryDirectory` / `MemoryRelay` with call
//! counters and failure toggles, so the tests can observe *which* remote
//! calls the coordinator makes and how it behaves when they fail.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rallypoint::{
    Config, CoordinatorError, CoordinatorEvent, HandoffRole, Identity, LiveTransport,
    SessionCoordinator, TransportError, HEARTBEAT_INTERVAL,
};
use rallypoint_directory::{
    CreateSessionOptions, DirectoryError, JoinOptions, MemoryDirectory, QueryOptions,
    SessionDirectory, UpdatePlayerOptions, UpdateSessionOptions,
};
use rallypoint_protocol::{ConnectionPayload, PlayerId, Session, SessionId};
use rallypoint_relay::{
    HostAllocation, JoinedAllocation, MemoryRelay, RelayError, RelayService,
};
use tokio::sync::mpsc::UnboundedReceiver;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Calls {
    get_session: AtomicUsize,
    remove_player: AtomicUsize,
    send_heartbeat: AtomicUsize,
}

/// Directory wrapper that counts selected calls and can fail polls on
/// demand.
#[derive(Clone)]
struct CountingDirectory {
    inner: MemoryDirectory,
    calls: Arc<Calls>,
    fail_get_session: Arc<AtomicBool>,
}

impl CountingDirectory {
    fn new() -> Self {
        Self {
            inner: MemoryDirectory::default(),
            calls: Arc::new(Calls::default()),
            fail_get_session: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SessionDirectory for CountingDirectory {
    async fn create_session(
        &self,
        name: &str,
        max_players: u32,
        options: CreateSessionOptions,
    ) -> Result<Session, DirectoryError> {
        self.inner.create_session(name, max_players, options).await
    }

    async fn query_sessions(&self, options: QueryOptions) -> Result<Vec<Session>, DirectoryError> {
        self.inner.query_sessions(options).await
    }

    async fn join_by_code(&self, code: &str, options: JoinOptions) -> Result<Session, DirectoryError> {
        self.inner.join_by_code(code, options).await
    }

    async fn join_by_id(&self, id: &SessionId, options: JoinOptions) -> Result<Session, DirectoryError> {
        self.inner.join_by_id(id, options).await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Session, DirectoryError> {
        self.calls.get_session.fetch_add(1, Ordering::SeqCst);
        if self.fail_get_session.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("injected outage".to_owned()));
        }
        self.inner.get_session(id).await
    }

    async fn update_session(
        &self,
        id: &SessionId,
        by: &PlayerId,
        options: UpdateSessionOptions,
    ) -> Result<Session, DirectoryError> {
        self.inner.update_session(id, by, options).await
    }

    async fn update_player(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
        options: UpdatePlayerOptions,
    ) -> Result<Session, DirectoryError> {
        self.inner.update_player(session_id, player_id, options).await
    }

    async fn remove_player(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
    ) -> Result<(), DirectoryError> {
        self.calls.remove_player.fetch_add(1, Ordering::SeqCst);
        self.inner.remove_player(session_id, player_id).await
    }

    async fn send_heartbeat(&self, session_id: &SessionId) -> Result<(), DirectoryError> {
        self.calls.send_heartbeat.fetch_add(1, Ordering::SeqCst);
        self.inner.send_heartbeat(session_id).await
    }
}

/// Relay wrapper whose allocation step can be made to fail.
#[derive(Clone)]
struct FlakyRelay {
    inner: MemoryRelay,
    fail_create: Arc<AtomicBool>,
}

impl FlakyRelay {
    fn new(inner: MemoryRelay) -> Self {
        Self {
            inner,
            fail_create: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RelayService for FlakyRelay {
    async fn create_allocation(&self, max_connections: u32) -> Result<HostAllocation, RelayError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RelayError::Unavailable("injected outage".to_owned()));
        }
        self.inner.create_allocation(max_connections).await
    }

    async fn get_join_code(
        &self,
        allocation_id: &rallypoint_protocol::AllocationId,
    ) -> Result<String, RelayError> {
        self.inner.get_join_code(allocation_id).await
    }

    async fn join_allocation(&self, join_code: &str) -> Result<JoinedAllocation, RelayError> {
        self.inner.join_allocation(join_code).await
    }
}

/// Transport that records every start call and can fail the client side.
#[derive(Clone, Default)]
struct RecordingTransport {
    started: Arc<Mutex<Vec<(&'static str, ConnectionPayload)>>>,
    fail_client: Arc<AtomicBool>,
}

impl RecordingTransport {
    fn starts(&self) -> Vec<&'static str> {
        self.started.lock().unwrap().iter().map(|(s, _)| *s).collect()
    }

    fn payloads(&self) -> Vec<ConnectionPayload> {
        self.started.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

impl LiveTransport for RecordingTransport {
    async fn start_host(
        &self,
        _allocation: &HostAllocation,
        payload: ConnectionPayload,
    ) -> Result<(), TransportError> {
        self.started.lock().unwrap().push(("host", payload));
        Ok(())
    }

    async fn start_client(
        &self,
        _allocation: &JoinedAllocation,
        payload: ConnectionPayload,
    ) -> Result<(), TransportError> {
        if self.fail_client.load(Ordering::SeqCst) {
            return Err(TransportError::StartFailed("injected failure".to_owned()));
        }
        self.started.lock().unwrap().push(("client", payload));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

type TestCoordinator = SessionCoordinator<CountingDirectory, FlakyRelay, RecordingTransport>;

struct Peer {
    coordinator: TestCoordinator,
    events: UnboundedReceiver<CoordinatorEvent>,
    transport: RecordingTransport,
}

impl Peer {
    fn new(id: &str, directory: CountingDirectory, relay: FlakyRelay) -> Self {
        let transport = RecordingTransport::default();
        let (coordinator, events) = SessionCoordinator::new(
            Identity::new(id, format!("player-{id}")),
            directory,
            relay,
            transport.clone(),
            Config::default(),
        );
        Self {
            coordinator,
            events,
            transport,
        }
    }

    fn drain_events(&mut self) -> Vec<CoordinatorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

fn pair() -> (Peer, Peer, CountingDirectory, FlakyRelay) {
    let directory = CountingDirectory::new();
    let relay = FlakyRelay::new(MemoryRelay::new());
    let host = Peer::new("host", directory.clone(), relay.clone());
    let client = Peer::new("client", directory.clone(), relay.clone());
    (host, client, directory, relay)
}

const POLL: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Leave semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_leave_without_session_makes_no_remote_call() {
    let (mut host, _client, directory, _relay) = pair();

    host.coordinator.leave_session().await.unwrap();
    host.coordinator.leave_session().await.unwrap();

    assert_eq!(directory.calls.remove_player.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_leave_after_join_calls_remote_exactly_once() {
    let (mut host, mut client, directory, _relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();

    client.coordinator.leave_session().await.unwrap();
    client.coordinator.leave_session().await.unwrap();

    assert_eq!(directory.calls.remove_player.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Heartbeats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_heartbeat_sent_by_host_on_interval() {
    let (mut host, _client, directory, _relay) = pair();
    host.coordinator.create_session("room", 4, false).await.unwrap();

    host.coordinator.tick(HEARTBEAT_INTERVAL).await;
    assert_eq!(directory.calls.send_heartbeat.load(Ordering::SeqCst), 1);

    // Part-way through the next interval: nothing.
    host.coordinator.tick(HEARTBEAT_INTERVAL / 2).await;
    assert_eq!(directory.calls.send_heartbeat.load(Ordering::SeqCst), 1);

    host.coordinator.tick(HEARTBEAT_INTERVAL / 2).await;
    assert_eq!(directory.calls.send_heartbeat.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_heartbeat_never_sent_by_client() {
    let (mut host, mut client, directory, _relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();

    client.coordinator.tick(HEARTBEAT_INTERVAL * 3).await;

    assert_eq!(directory.calls.send_heartbeat.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Poll failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_poll_failure_keeps_stale_snapshot() {
    let (mut host, mut client, directory, _relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();
    host.coordinator.tick(POLL).await;
    assert_eq!(host.coordinator.current_session().unwrap().players.len(), 2);
    host.drain_events();

    // Client leaves while the directory is unreachable from the host.
    directory.fail_get_session.store(true, Ordering::SeqCst);
    client.coordinator.leave_session().await.unwrap();
    host.coordinator.tick(POLL).await;

    // Stale but intact: still shows two players, and no update events
    // were emitted for the failed poll.
    assert_eq!(host.coordinator.current_session().unwrap().players.len(), 2);
    assert!(host.drain_events().is_empty());

    // Recovery on the next successful poll.
    directory.fail_get_session.store(false, Ordering::SeqCst);
    host.coordinator.tick(POLL).await;
    assert_eq!(host.coordinator.current_session().unwrap().players.len(), 1);
    let events = host.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, CoordinatorEvent::RosterChanged(c) if c.removed.len() == 1)));
}

// ---------------------------------------------------------------------------
// Relay handoff
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_start_game_rejected_for_non_host() {
    let (mut host, mut client, _directory, relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();

    let result = client.coordinator.start_game().await;

    assert!(matches!(result, Err(CoordinatorError::NotHost)));
    assert!(client.coordinator.is_in_session());
    assert!(relay.inner.is_empty().await);
}

#[tokio::test]
async fn test_start_game_requires_session() {
    let (mut host, _client, _directory, _relay) = pair();
    assert!(matches!(
        host.coordinator.start_game().await,
        Err(CoordinatorError::NotInSession)
    ));
}

#[tokio::test]
async fn test_start_game_failure_leaves_session_untouched() {
    let (mut host, _client, directory, relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();

    relay.fail_create.store(true, Ordering::SeqCst);
    let result = host.coordinator.start_game().await;

    assert!(matches!(result, Err(CoordinatorError::Relay(_))));
    assert!(host.coordinator.is_in_session());
    // Code never published: the remote session still carries the sentinel.
    let remote = directory.get_session(&session.id).await.unwrap();
    assert!(remote.relay_join_code().is_none());

    // A retry after the outage succeeds.
    relay.fail_create.store(false, Ordering::SeqCst);
    host.coordinator.start_game().await.unwrap();
    assert!(!host.coordinator.is_in_session());
}

#[tokio::test]
async fn test_full_handoff_host_and_client_enter_live_session() {
    let (mut host, mut client, directory, relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();

    host.coordinator.start_game().await.unwrap();

    // Host side: transport started as host, session left, event emitted.
    assert_eq!(host.transport.starts(), vec!["host"]);
    assert!(!host.coordinator.is_in_session());
    assert!(host.drain_events().iter().any(|e| matches!(
        e,
        CoordinatorEvent::LiveSessionEntered { role: HandoffRole::Host }
    )));

    // The published code is visible in the directory (the client still
    // holds the session open).
    let remote = directory.get_session(&session.id).await.unwrap();
    let code = remote.relay_join_code().map(str::to_owned);
    assert!(code.is_some());

    // Client side: next poll detects the code, joins the relay, starts
    // the transport, and leaves the directory session.
    client.coordinator.tick(POLL).await;

    assert_eq!(client.transport.starts(), vec!["client"]);
    assert!(!client.coordinator.is_in_session());
    assert!(client.drain_events().iter().any(|e| matches!(
        e,
        CoordinatorEvent::LiveSessionEntered { role: HandoffRole::Client }
    )));

    // Last member gone: the directory session is deleted.
    assert!(matches!(
        directory.get_session(&session.id).await,
        Err(DirectoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_client_handoff_happens_exactly_once() {
    let (mut host, mut client, _directory, _relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();
    host.coordinator.start_game().await.unwrap();

    client.coordinator.tick(POLL).await;
    client.coordinator.tick(POLL).await;
    client.coordinator.tick(POLL).await;

    assert_eq!(client.transport.starts(), vec!["client"]);
}

#[tokio::test]
async fn test_client_handoff_failure_stays_in_session_and_retries() {
    let (mut host, mut client, _directory, _relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();
    host.coordinator.start_game().await.unwrap();

    client.transport.fail_client.store(true, Ordering::SeqCst);
    client.coordinator.tick(POLL).await;

    assert!(client.coordinator.is_in_session());
    assert!(client.drain_events().iter().any(|e| matches!(
        e,
        CoordinatorEvent::HandoffFailed { .. }
    )));

    // Transport recovers; the next poll completes the handoff.
    client.transport.fail_client.store(false, Ordering::SeqCst);
    client.coordinator.tick(POLL).await;

    assert_eq!(client.transport.starts(), vec!["client"]);
    assert!(!client.coordinator.is_in_session());
}

#[tokio::test]
async fn test_client_handoff_retries_reuse_one_relay_slot() {
    let (mut host, mut client, _directory, _relay) = pair();
    // Two players means a single relay slot. If every retry joined the
    // allocation again, the second attempt would already find it full.
    let session = host.coordinator.create_session("duo", 2, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();
    host.coordinator.start_game().await.unwrap();

    client.transport.fail_client.store(true, Ordering::SeqCst);
    client.coordinator.tick(POLL).await;
    client.coordinator.tick(POLL).await;
    assert!(client.coordinator.is_in_session());
    assert_eq!(
        client
            .drain_events()
            .iter()
            .filter(|e| matches!(e, CoordinatorEvent::HandoffFailed { .. }))
            .count(),
        2
    );

    client.transport.fail_client.store(false, Ordering::SeqCst);
    client.coordinator.tick(POLL).await;

    assert_eq!(client.transport.starts(), vec!["client"]);
    assert!(!client.coordinator.is_in_session());
    assert!(client.drain_events().iter().any(|e| matches!(
        e,
        CoordinatorEvent::LiveSessionEntered { role: HandoffRole::Client }
    )));
}

#[tokio::test]
async fn test_handoff_payload_carries_roster_identity() {
    let (mut host, mut client, _directory, _relay) = pair();
    let session = host.coordinator.create_session("room", 4, false).await.unwrap();
    client.coordinator.join_by_code(&session.join_code).await.unwrap();
    let roster_color = client
        .coordinator
        .local_roster_entry()
        .unwrap()
        .color
        .clone();

    host.coordinator.start_game().await.unwrap();
    client.coordinator.tick(POLL).await;

    let payloads = client.transport.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].player_id, "client");
    assert_eq!(payloads[0].player_name, "player-client");
    assert_eq!(payloads[0].player_color, roster_color);
}
