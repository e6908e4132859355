//! Bootstrap: turning a started room into a live session.
//!
//! The session host doesn't know who is in a match until it asks the
//! room broker. [`BootstrapCoordinator`] runs that exchange exactly once
//! per session:
//!
//! ```text
//! CreateGameWithInstance
//!   ├─ lock → reserve placeholder (Loading) → unlock
//!   ├─ GetRoomState on the broker, bounded by upstream_timeout
//!   └─ lock → hydrate roster (Playing)  |  drop placeholder → unlock
//! ```
//!
//! The registry lock is never held across the network call.

use std::future::Future;
use std::time::Instant;

use roomgate_protocol::{RoomId, RoomSnapshot, SessionId};
use tokio::sync::Mutex;

use crate::{BootstrapConfig, SessionError, SessionRegistry};

/// Where a session host fetches the authoritative room roster from.
///
/// In production this is an RPC client for the room broker; tests plug in
/// an in-memory table.
pub trait RoomStateSource: Send + Sync + 'static {
    /// Fetches the room's current snapshot.
    ///
    /// # Returns
    /// - `Err(SessionError::RoomNotFound)` — the broker has no such room
    /// - `Err(SessionError::UpstreamUnavailable)` — the broker couldn't
    ///   be reached
    fn fetch_room(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<RoomSnapshot, SessionError>> + Send;
}

/// Runs the one-shot hydration of new sessions.
pub struct BootstrapCoordinator<S: RoomStateSource> {
    source: S,
    config: BootstrapConfig,
}

impl<S: RoomStateSource> BootstrapCoordinator<S> {
    pub fn new(source: S, config: BootstrapConfig) -> Self {
        Self { source, config }
    }

    /// Fetches a room's roster from the broker within the deadline.
    ///
    /// # Errors
    /// [`SessionError::UpstreamUnavailable`] on timeout, plus whatever the
    /// source reports.
    pub async fn fetch(&self, room_id: &RoomId) -> Result<RoomSnapshot, SessionError> {
        let deadline = self.config.upstream_timeout;
        match tokio::time::timeout(deadline, self.source.fetch_room(room_id)).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::UpstreamUnavailable(format!(
                "GetRoomState for room {room_id} timed out after {deadline:?}"
            ))),
        }
    }

    /// Creates and hydrates `session_id` from `room_id`'s membership.
    ///
    /// On any failure after the placeholder was registered, the
    /// placeholder is removed again so the caller may retry.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyExists`] — checked before contacting
    ///   the broker
    /// - [`SessionError::RoomNotFound`] / [`SessionError::UpstreamUnavailable`]
    ///   — from the broker round trip
    pub async fn create_session(
        &self,
        sessions: &Mutex<SessionRegistry>,
        session_id: SessionId,
        room_id: RoomId,
    ) -> Result<(), SessionError> {
        sessions
            .lock()
            .await
            .reserve(session_id.clone(), room_id.clone(), Instant::now())?;

        let fetched = self.fetch(&room_id).await;

        let mut registry = sessions.lock().await;
        let result = match fetched {
            Ok(room) => registry.hydrate(&session_id, &room, Instant::now()),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            registry.abandon(&session_id);
            tracing::warn!(%session_id, %room_id, error = %e, "session bootstrap failed");
        }
        result
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
