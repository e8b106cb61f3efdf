//! Two players matchmake and hand off to a relay, fully in-process.
//!
//! Ada hosts a session, Grace finds it through a search and joins, both
//! coordinators run on background tick drivers, and when Ada starts the
//! game the whole party migrates to a relay allocation. Run with
//! `RUST_LOG=debug` to watch every poll and heartbeat.

use std::sync::Arc;
use std::time::Duration;

use rallypoint::prelude::*;
use rallypoint::spawn_driver;
use rallypoint_protocol::ConnectionPayload;
use rallypoint_relay::{HostAllocation, JoinedAllocation};
use tokio::sync::{mpsc::UnboundedReceiver, Mutex};
use tracing_subscriber::EnvFilter;

/// Stands in for the real game-traffic layer: logs the handoff material
/// and reports success.
struct LoggingTransport {
    label: &'static str,
}

impl LiveTransport for LoggingTransport {
    async fn start_host(
        &self,
        allocation: &HostAllocation,
        payload: ConnectionPayload,
    ) -> Result<(), TransportError> {
        tracing::info!(
            label = self.label,
            server = %format!("{}:{}", allocation.server_address, allocation.server_port),
            player = %payload.player_name,
            "transport started as HOST"
        );
        Ok(())
    }

    async fn start_client(
        &self,
        allocation: &JoinedAllocation,
        payload: ConnectionPayload,
    ) -> Result<(), TransportError> {
        tracing::info!(
            label = self.label,
            server = %format!("{}:{}", allocation.server_address, allocation.server_port),
            player = %payload.player_name,
            "transport started as CLIENT"
        );
        Ok(())
    }
}

fn peer(
    id: &str,
    name: &'static str,
    directory: MemoryDirectory,
    relay: MemoryRelay,
) -> (
    Arc<Mutex<SessionCoordinator<MemoryDirectory, MemoryRelay, LoggingTransport>>>,
    UnboundedReceiver<CoordinatorEvent>,
) {
    let (coordinator, events) = SessionCoordinator::new(
        Identity::new(id, name),
        directory,
        relay,
        LoggingTransport { label: name },
        Config {
            poll_interval: Duration::from_millis(500),
        },
    );
    (Arc::new(Mutex::new(coordinator)), events)
}

/// Logs a peer's event stream and resolves once it enters the live
/// session.
fn watch_events(name: &'static str, mut events: UnboundedReceiver<CoordinatorEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                CoordinatorEvent::SessionUpdated(session) => {
                    tracing::debug!(peer = name, occupancy = %session.occupancy(), "session updated");
                }
                CoordinatorEvent::RosterChanged(changes) => {
                    for player in &changes.added {
                        tracing::info!(peer = name, who = %player.name, color = %player.color, "player joined");
                    }
                    for player in &changes.removed {
                        tracing::info!(peer = name, who = %player.name, "player left");
                    }
                }
                CoordinatorEvent::LiveSessionEntered { role } => {
                    tracing::info!(peer = name, %role, "entered live session");
                    break;
                }
                CoordinatorEvent::HandoffFailed { reason } => {
                    tracing::warn!(peer = name, %reason, "handoff failed, will retry");
                }
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), CoordinatorError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let directory = MemoryDirectory::default();
    let relay = MemoryRelay::new();

    let (ada, ada_events) = peer("p-ada", "Ada", directory.clone(), relay.clone());
    let (grace, grace_events) = peer("p-grace", "Grace", directory.clone(), relay.clone());

    // Ada hosts.
    let session = ada
        .lock()
        .await
        .create_session("friday night matchup", 4, false)
        .await?;
    tracing::info!(session_id = %session.id, join_code = %session.join_code, "Ada is hosting");

    // Grace browses and joins what she finds.
    let found = grace.lock().await.search_sessions(25).await?;
    tracing::info!(found = found.len(), "Grace searched the directory");
    let Some(target) = found.first().map(|s| s.id.clone()) else {
        tracing::error!("no joinable sessions in the directory");
        return Ok(());
    };
    grace.lock().await.join_by_id(&target).await?;
    grace.lock().await.cycle_color().await?;

    // Background drivers take over polling and heartbeats.
    let ada_driver = spawn_driver(ada.clone(), Duration::from_millis(250));
    let grace_driver = spawn_driver(grace.clone(), Duration::from_millis(250));
    let ada_watch = watch_events("Ada", ada_events);
    let grace_watch = watch_events("Grace", grace_events);

    // Give the rosters a moment to sync, then start the game.
    tokio::time::sleep(Duration::from_secs(2)).await;
    ada.lock().await.start_game().await?;

    // Both peers should land in the live session; Grace gets there via
    // her next poll.
    let _ = tokio::time::timeout(Duration::from_secs(10), async {
        let _ = ada_watch.await;
        let _ = grace_watch.await;
    })
    .await;

    ada_driver.stop().await;
    grace_driver.stop().await;

    tracing::info!(
        directory_empty = directory.is_empty().await,
        "matchup complete, everyone is on the relay"
    );
    Ok(())
}
