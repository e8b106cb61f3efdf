//! An in-process directory backend.
//!
//! `MemoryDirectory` is a complete [`SessionDirectory`] implementation that
//! keeps every session in a shared map. It exists for tests, demos, and
//! offline play against the real coordinator — the same lifecycle rules a
//! hosted directory enforces (capacity, privacy, host authority, host
//! migration, liveness expiry), without the network.
//!
//! Cloning a `MemoryDirectory` clones a handle to the *same* registry, so
//! several coordinators can share one directory the way they would share
//! one remote service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use rallypoint_protocol::{Player, PlayerId, Session, SessionId};
use tokio::sync::Mutex;

use crate::{
    CreateSessionOptions, DirectoryError, JoinOptions, QueryOptions, QueryOrder,
    SessionDirectory, UpdatePlayerOptions, UpdateSessionOptions,
};

/// Join codes avoid 0/O and 1/I so they survive being read aloud.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

/// Configuration for the in-memory backend.
#[derive(Debug, Clone)]
pub struct MemoryDirectoryConfig {
    /// How long (in seconds) a session survives without a host heartbeat
    /// before [`MemoryDirectory::expire_stale`] removes it.
    ///
    /// Default: 30 seconds — long enough that a host beating every 14
    /// seconds can miss one beat without losing the session.
    pub liveness_window_secs: u64,
}

impl Default for MemoryDirectoryConfig {
    fn default() -> Self {
        Self {
            liveness_window_secs: 30,
        }
    }
}

/// A registered session plus the bookkeeping the service needs.
struct Stored {
    session: Session,
    created_at: Instant,
    last_heartbeat: Instant,
}

#[derive(Default)]
struct Registry {
    /// All live sessions, keyed by id.
    sessions: HashMap<SessionId, Stored>,

    /// Index from join code to session id, kept in sync with `sessions`.
    codes: HashMap<String, SessionId>,
}

/// In-process [`SessionDirectory`] implementation.
#[derive(Clone)]
pub struct MemoryDirectory {
    config: MemoryDirectoryConfig,
    registry: Arc<Mutex<Registry>>,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new(MemoryDirectoryConfig::default())
    }
}

impl MemoryDirectory {
    pub fn new(config: MemoryDirectoryConfig) -> Self {
        Self {
            config,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Removes every session whose host heartbeat is overdue.
    ///
    /// A hosted directory runs this sweep itself; callers embedding the
    /// memory backend should run it periodically. Returns the ids that were
    /// expired.
    pub async fn expire_stale(&self) -> Vec<SessionId> {
        let window = Duration::from_secs(self.config.liveness_window_secs);
        let mut registry = self.registry.lock().await;

        let expired: Vec<SessionId> = registry
            .sessions
            .iter()
            .filter(|(_, stored)| stored.last_heartbeat.elapsed() > window)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(stored) = registry.sessions.remove(id) {
                registry.codes.remove(&stored.session.join_code);
                tracing::info!(session_id = %id, "session expired (no heartbeat)");
            }
        }

        expired
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.registry.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.lock().await.sessions.is_empty()
    }
}

impl SessionDirectory for MemoryDirectory {
    async fn create_session(
        &self,
        name: &str,
        max_players: u32,
        options: CreateSessionOptions,
    ) -> Result<Session, DirectoryError> {
        if name.trim().is_empty() {
            return Err(DirectoryError::Rejected("session name is blank".into()));
        }
        if max_players == 0 {
            return Err(DirectoryError::Rejected(
                "max_players must be at least 1".into(),
            ));
        }

        let mut registry = self.registry.lock().await;

        let id = SessionId::new(generate_id());
        let join_code = generate_join_code();
        let host = options.host_player;

        let session = Session {
            id: id.clone(),
            name: name.to_owned(),
            join_code: join_code.clone(),
            is_private: options.is_private,
            max_players,
            host_id: host.id.clone(),
            players: vec![host],
            metadata: options.metadata,
        };

        registry.codes.insert(join_code, id.clone());
        registry.sessions.insert(
            id.clone(),
            Stored {
                session: session.clone(),
                created_at: Instant::now(),
                last_heartbeat: Instant::now(),
            },
        );

        tracing::info!(session_id = %id, name, "session created");
        Ok(session)
    }

    async fn query_sessions(
        &self,
        options: QueryOptions,
    ) -> Result<Vec<Session>, DirectoryError> {
        let registry = self.registry.lock().await;

        let mut matches: Vec<&Stored> = registry
            .sessions
            .values()
            .filter(|stored| !stored.session.is_private)
            .filter(|stored| match options.min_open_slots {
                Some(slots) => stored.session.open_slots() >= slots,
                None => true,
            })
            .collect();

        match options.order {
            QueryOrder::NewestFirst => {
                matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            QueryOrder::OldestFirst => {
                matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            }
        }
        matches.truncate(options.count);

        Ok(matches.into_iter().map(|s| s.session.clone()).collect())
    }

    async fn join_by_code(
        &self,
        code: &str,
        options: JoinOptions,
    ) -> Result<Session, DirectoryError> {
        let normalized = code.trim().to_uppercase();
        let mut registry = self.registry.lock().await;

        let id = registry
            .codes
            .get(&normalized)
            .cloned()
            .ok_or_else(|| DirectoryError::InvalidJoinCode(code.to_owned()))?;

        join_roster(&mut registry, &id, options.player)
    }

    async fn join_by_id(
        &self,
        id: &SessionId,
        options: JoinOptions,
    ) -> Result<Session, DirectoryError> {
        let mut registry = self.registry.lock().await;
        if !registry.sessions.contains_key(id) {
            return Err(DirectoryError::NotFound(id.clone()));
        }
        join_roster(&mut registry, id, options.player)
    }

    async fn get_session(&self, id: &SessionId) -> Result<Session, DirectoryError> {
        let registry = self.registry.lock().await;
        registry
            .sessions
            .get(id)
            .map(|stored| stored.session.clone())
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))
    }

    async fn update_session(
        &self,
        id: &SessionId,
        by: &PlayerId,
        options: UpdateSessionOptions,
    ) -> Result<Session, DirectoryError> {
        let mut registry = self.registry.lock().await;
        let stored = registry
            .sessions
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;

        // The binding authority check: only the host mutates session fields.
        if &stored.session.host_id != by {
            return Err(DirectoryError::NotHost(by.clone()));
        }

        if let Some(max_players) = options.max_players {
            if (max_players as usize) < stored.session.players.len() {
                return Err(DirectoryError::Rejected(format!(
                    "max_players {max_players} is below current roster size {}",
                    stored.session.players.len()
                )));
            }
            stored.session.max_players = max_players;
        }
        if let Some(is_private) = options.is_private {
            stored.session.is_private = is_private;
        }
        if let Some(metadata) = options.metadata {
            // Key-by-key merge: entries not named in the update survive.
            stored.session.metadata.extend(metadata);
        }

        tracing::debug!(session_id = %id, "session updated");
        Ok(stored.session.clone())
    }

    async fn update_player(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
        options: UpdatePlayerOptions,
    ) -> Result<Session, DirectoryError> {
        let mut registry = self.registry.lock().await;
        let stored = registry
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| DirectoryError::NotFound(session_id.clone()))?;

        let player = stored
            .session
            .players
            .iter_mut()
            .find(|p| &p.id == player_id)
            .ok_or_else(|| {
                DirectoryError::Rejected(format!("player {player_id} is not on the roster"))
            })?;

        if let Some(name) = options.name {
            player.name = name;
        }
        if let Some(color) = options.color {
            player.color = color;
        }
        if let Some(metadata) = options.metadata {
            player.metadata.extend(metadata);
        }

        tracing::debug!(session_id = %session_id, %player_id, "player updated");
        Ok(stored.session.clone())
    }

    async fn remove_player(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
    ) -> Result<(), DirectoryError> {
        let mut registry = self.registry.lock().await;
        let stored = registry
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| DirectoryError::NotFound(session_id.clone()))?;

        let before = stored.session.players.len();
        stored.session.players.retain(|p| &p.id != player_id);
        if stored.session.players.len() == before {
            return Err(DirectoryError::Rejected(format!(
                "player {player_id} is not on the roster"
            )));
        }

        if stored.session.players.is_empty() {
            // Last player out deletes the session.
            let join_code = stored.session.join_code.clone();
            registry.sessions.remove(session_id);
            registry.codes.remove(&join_code);
            tracing::info!(session_id = %session_id, "session deleted (roster empty)");
            return Ok(());
        }

        if &stored.session.host_id == player_id {
            // Host left: promote the longest-present remaining member.
            let new_host = stored.session.players[0].id.clone();
            stored.session.host_id = new_host.clone();
            tracing::info!(
                session_id = %session_id,
                old_host = %player_id,
                new_host = %new_host,
                "host migrated"
            );
        } else {
            tracing::info!(session_id = %session_id, %player_id, "player removed");
        }

        Ok(())
    }

    async fn send_heartbeat(&self, session_id: &SessionId) -> Result<(), DirectoryError> {
        let mut registry = self.registry.lock().await;
        let stored = registry
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| DirectoryError::NotFound(session_id.clone()))?;

        stored.last_heartbeat = Instant::now();
        tracing::trace!(session_id = %session_id, "heartbeat");
        Ok(())
    }
}

/// Appends a player to a session's roster, enforcing capacity and
/// uniqueness. Caller has already resolved the session id.
fn join_roster(
    registry: &mut Registry,
    id: &SessionId,
    player: Player,
) -> Result<Session, DirectoryError> {
    let stored = registry
        .sessions
        .get_mut(id)
        .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;

    if stored.session.contains_player(&player.id) {
        return Err(DirectoryError::Rejected(format!(
            "player {} is already on the roster",
            player.id
        )));
    }
    if !stored.session.has_open_slots() {
        return Err(DirectoryError::SessionFull(id.clone()));
    }

    tracing::info!(session_id = %id, player_id = %player.id, "player joined");
    stored.session.players.push(player);
    Ok(stored.session.clone())
}

/// Random 12-hex-character session id.
fn generate_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 6] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Random 6-character join code from the unambiguous alphabet.
fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

// =========================================================================
// Tests
// =========================================================================
