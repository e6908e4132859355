//! RPC request and response messages for the room and session services.
//!
//! Requests are internally tagged by `method`, responses by the method
//! they answer. Handler-level failures are never transport faults: every
//! reply has an `ok` flag and a human-readable `message`. The `Fault`
//! variant is reserved for requests the server couldn't even decode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    PlayerId, PlayerInfo, ReadinessState, RoomId, RoomSnapshot,
    SessionAssignment, SessionId, SessionLifecycleState,
};

// ---------------------------------------------------------------------------
// Shared replies
// ---------------------------------------------------------------------------

/// A bare success/failure reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    pub message: String,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl<E: fmt::Display> From<Result<(), E>> for Ack {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::rejected(e.to_string()),
        }
    }
}

/// The server couldn't decode the request.
///
/// `code` follows HTTP conventions (400 = bad request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub code: u16,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Room service
// ---------------------------------------------------------------------------

/// Calls accepted by the room broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum RoomRequest {
    /// Open a new room owned by `owner`. An empty `map_id` selects the
    /// broker's default map.
    CreateRoom { owner: PlayerId, map_id: String },

    /// Add `player_id` to a waiting room.
    JoinRoom { room_id: RoomId, player_id: PlayerId },

    /// Read a room's full state.
    GetRoomState { room_id: RoomId },

    /// Hand the room over to a session host. Only the owner may do this.
    StartGame { room_id: RoomId, requester: PlayerId },

    /// Update a member's lobby status.
    SetReadiness {
        room_id: RoomId,
        player_id: PlayerId,
        state: ReadinessState,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomReply {
    pub ok: bool,
    pub room_id: RoomId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStateReply {
    pub ok: bool,
    pub message: String,
    pub room: Option<RoomSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGameReply {
    pub ok: bool,
    pub message: String,
    pub assignment: Option<SessionAssignment>,
}

/// Replies from the room broker, one variant per [`RoomRequest`] method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "reply")]
pub enum RoomResponse {
    CreateRoom(CreateRoomReply),
    JoinRoom(Ack),
    GetRoomState(RoomStateReply),
    StartGame(StartGameReply),
    SetReadiness(Ack),
    Fault(Fault),
}

// ---------------------------------------------------------------------------
// Session service
// ---------------------------------------------------------------------------

/// Calls accepted by a session host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum SessionRequest {
    /// Create the session and hydrate its roster from the room broker.
    CreateGameWithInstance { session_id: SessionId, room_id: RoomId },

    /// Read the roster. Only allowed inside the read window.
    GetGameState { session_id: SessionId },

    /// Replace one player's state. Only allowed inside the write window.
    PostGameState { session_id: SessionId, player: PlayerInfo },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateReply {
    pub ok: bool,
    pub message: String,
    pub state: Option<SessionLifecycleState>,
    pub players: Vec<PlayerInfo>,
}

/// Replies from a session host, one variant per [`SessionRequest`] method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "reply")]
pub enum SessionResponse {
    CreateGameWithInstance(Ack),
    GetGameState(GameStateReply),
    PostGameState(Ack),
    Fault(Fault),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Envelope;

    #[test]
    fn test_room_request_json_shape_is_method_and_params() {
        let req = RoomRequest::JoinRoom {
            room_id: RoomId::from(3),
            player_id: PlayerId::from("bob"),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["method"], "JoinRoom");
        assert_eq!(value["params"]["room_id"], "3");
        assert_eq!(value["params"]["player_id"], "bob");
    }

    #[test]
    fn test_session_response_json_shape_is_method_and_reply() {
        let resp = SessionResponse::PostGameState(Ack::rejected("closed"));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["method"], "PostGameState");
        assert_eq!(value["reply"]["ok"], false);
        assert_eq!(value["reply"]["message"], "closed");
    }

    #[test]
    fn test_ack_from_result_carries_error_display() {
        let ack: Ack = Err::<(), _>("room 9 not found").into();
        assert!(!ack.ok);
        assert_eq!(ack.message, "room 9 not found");

        let ack: Ack = Ok::<(), String>(()).into();
        assert!(ack.ok);
        assert!(ack.message.is_empty());
    }

    #[test]
    fn test_envelope_wraps_request_with_seq() {
        let env = Envelope::new(
            5,
            SessionRequest::GetGameState {
                session_id: SessionId::from("1_GID"),
            },
        );
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["seq"], 5);
        assert_eq!(value["payload"]["method"], "GetGameState");
    }
}
