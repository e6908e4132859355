//! Error types for the session layer.

use roomgate_protocol::{PlayerId, RoomId, SessionId, SessionLifecycleState};

use crate::Access;

/// Errors that can occur while creating, reading, or writing sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session with this ID is registered on this host.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// A session with this ID already exists; creation is one-shot.
    #[error("session {0} already exists")]
    AlreadyExists(SessionId),

    /// The access was attempted outside the window that permits it.
    #[error("{access} forbidden for session {session_id} in the current window")]
    WindowForbidden { session_id: SessionId, access: Access },

    /// The session's lifecycle state doesn't allow this operation.
    #[error("session {session_id} is {state}, cannot {operation}")]
    InvalidState {
        session_id: SessionId,
        state: SessionLifecycleState,
        operation: &'static str,
    },

    /// The player isn't part of this session's roster.
    #[error("player {0} is not in session {1}")]
    PlayerNotFound(PlayerId, SessionId),

    /// The room broker reports that the room doesn't exist.
    #[error("room {0} not found on the room broker")]
    RoomNotFound(RoomId),

    /// The room broker couldn't be reached or didn't answer in time.
    #[error("room broker unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A configuration value is out of range.
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
}
