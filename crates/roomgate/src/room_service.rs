//! The room broker's RPC façade.

use roomgate_protocol::{
    Ack, CreateRoomReply, Fault, RoomRequest, RoomResponse, RoomStateReply,
    StartGameReply,
};
use roomgate_room::{HostDirectory, RoomRegistry};
use tokio::sync::Mutex;

use crate::rpc::Service;

/// Serves [`RoomRequest`]s against one [`RoomRegistry`].
///
/// Every call takes the registry lock for exactly one registry operation,
/// which makes each operation atomic with respect to all others.
pub struct RoomService<D: HostDirectory> {
    rooms: Mutex<RoomRegistry<D>>,
}

impl<D: HostDirectory> RoomService<D> {
    pub fn new(rooms: RoomRegistry<D>) -> Self {
        Self {
            rooms: Mutex::new(rooms),
        }
    }

    /// The underlying registry, for inspection and administrative resets.
    pub fn rooms(&self) -> &Mutex<RoomRegistry<D>> {
        &self.rooms
    }
}

impl<D: HostDirectory> Service for RoomService<D> {
    type Request = RoomRequest;
    type Response = RoomResponse;

    async fn handle(&self, request: RoomRequest) -> RoomResponse {
        match request {
            RoomRequest::CreateRoom { owner, map_id } => {
                let room_id = self.rooms.lock().await.create_room(owner, &map_id);
                RoomResponse::CreateRoom(CreateRoomReply { ok: true, room_id })
            }
            RoomRequest::JoinRoom { room_id, player_id } => {
                let result = self.rooms.lock().await.join_room(&room_id, player_id);
                RoomResponse::JoinRoom(Ack::from(result))
            }
            RoomRequest::GetRoomState { room_id } => {
                let reply = match self.rooms.lock().await.room_state(&room_id) {
                    Ok(room) => RoomStateReply {
                        ok: true,
                        message: String::new(),
                        room: Some(room),
                    },
                    Err(e) => RoomStateReply {
                        ok: false,
                        message: e.to_string(),
                        room: None,
                    },
                };
                RoomResponse::GetRoomState(reply)
            }
            RoomRequest::StartGame { room_id, requester } => {
                let result = self.rooms.lock().await.start_game(&room_id, &requester);
                let reply = match result {
                    Ok(assignment) => StartGameReply {
                        ok: true,
                        message: String::new(),
                        assignment: Some(assignment),
                    },
                    Err(e) => {
                        tracing::debug!(%room_id, %requester, error = %e, "start refused");
                        StartGameReply {
                            ok: false,
                            message: e.to_string(),
                            assignment: None,
                        }
                    }
                };
                RoomResponse::StartGame(reply)
            }
            RoomRequest::SetReadiness {
                room_id,
                player_id,
                state,
            } => {
                let result = self.rooms.lock().await.set_readiness(&room_id, &player_id, state);
                RoomResponse::SetReadiness(Ack::from(result))
            }
        }
    }

    fn fault(code: u16, message: String) -> RoomResponse {
        RoomResponse::Fault(Fault { code, message })
    }
}
