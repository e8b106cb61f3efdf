//! The directory client trait.
//!
//! One method per remote call, mirroring the hosted service's API surface.
//! Adapters over a real service (HTTP, vendor SDK) implement this trait;
//! so does the in-process [`MemoryDirectory`](crate::MemoryDirectory).
//!
//! # Why a trait?
//!
//! The coordinator's lifecycle logic is identical whether the directory is
//! a hosted service or an in-process fake. Putting the boundary behind a
//! trait keeps that logic testable without network access and keeps vendor
//! SDK types out of the core.

use rallypoint_protocol::{PlayerId, Session, SessionId};

use crate::{
    CreateSessionOptions, DirectoryError, JoinOptions, QueryOptions, UpdatePlayerOptions,
    UpdateSessionOptions,
};

/// Client for a remote session directory.
///
/// # Trait bounds
///
/// - `Send + Sync` — the client is shared with spawned tasks (the tick
///   driver runs the coordinator from a Tokio task).
/// - `'static` — it doesn't borrow temporary data; it lives as long as the
///   coordinator that owns it.
///
/// Every call is fallible and every failure is a [`DirectoryError`]; the
/// caller decides whether to surface, retry, or swallow it. Mutation
/// authority (host-only fields) is enforced by the service side of this
/// boundary — callers may pre-check to save a round trip, but the remote
/// check is the binding one.
pub trait SessionDirectory: Send + Sync + 'static {
    /// Creates a session and installs `options.host_player` as its host.
    fn create_session(
        &self,
        name: &str,
        max_players: u32,
        options: CreateSessionOptions,
    ) -> impl std::future::Future<Output = Result<Session, DirectoryError>> + Send;

    /// Lists joinable sessions. Read-only; never affects any session.
    fn query_sessions(
        &self,
        options: QueryOptions,
    ) -> impl std::future::Future<Output = Result<Vec<Session>, DirectoryError>> + Send;

    /// Joins the session advertised under the given short code.
    fn join_by_code(
        &self,
        code: &str,
        options: JoinOptions,
    ) -> impl std::future::Future<Output = Result<Session, DirectoryError>> + Send;

    /// Joins the session with the given id.
    fn join_by_id(
        &self,
        id: &SessionId,
        options: JoinOptions,
    ) -> impl std::future::Future<Output = Result<Session, DirectoryError>> + Send;

    /// Fetches the current authoritative snapshot of a session.
    fn get_session(
        &self,
        id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Session, DirectoryError>> + Send;

    /// Updates session-level fields. Host-only: the service rejects the
    /// update with [`DirectoryError::NotHost`] when `by` is not the host.
    fn update_session(
        &self,
        id: &SessionId,
        by: &PlayerId,
        options: UpdateSessionOptions,
    ) -> impl std::future::Future<Output = Result<Session, DirectoryError>> + Send;

    /// Updates one roster member's own fields (name, color, metadata).
    fn update_player(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
        options: UpdatePlayerOptions,
    ) -> impl std::future::Future<Output = Result<Session, DirectoryError>> + Send;

    /// Removes a player from the roster. Removing the last player deletes
    /// the session; removing the host promotes another member.
    fn remove_player(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
    ) -> impl std::future::Future<Output = Result<(), DirectoryError>> + Send;

    /// Liveness signal. Sent periodically by the host to keep the session
    /// from expiring out of the directory.
    fn send_heartbeat(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), DirectoryError>> + Send;
}
