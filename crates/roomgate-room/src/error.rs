//! Error types for the room layer.

use roomgate_protocol::{PlayerId, RoomId, RoomLifecycleState};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (or belonged to an earlier ID epoch).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is in a lifecycle state that doesn't allow this operation.
    #[error("room {room_id} is {state}, cannot {operation}")]
    InvalidState {
        room_id: RoomId,
        state: RoomLifecycleState,
        operation: &'static str,
    },

    /// The player already has a seat in this room.
    #[error("player {0} is already in room {1}")]
    AlreadyMember(PlayerId, RoomId),

    /// The player has no seat in this room.
    #[error("player {0} is not in room {1}")]
    NotMember(PlayerId, RoomId),

    /// The caller lacks the required relationship to the room.
    #[error("player {player} is not the owner of room {room_id}")]
    PermissionDenied { player: PlayerId, room_id: RoomId },
}
