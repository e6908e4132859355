//! Typed RPC clients for the room broker and session hosts.
//!
//! Each call dials a fresh connection, sends one envelope and waits for
//! the reply with the same `seq`. The deadline covers the whole round
//! trip, dial included.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use roomgate_protocol::{
    Ack, Codec, Envelope, Fault, JsonCodec, PlayerId, PlayerInfo, ProtocolError,
    ReadinessState, RoomId, RoomRequest, RoomResponse, RoomSnapshot,
    SessionAssignment, SessionId, SessionRequest, SessionResponse,
};
use roomgate_session::{GameSnapshot, RoomStateSource, SessionError};
use roomgate_transport::{Connection, TransportError, WebSocketConnection};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::RoomgateError;

/// Default deadline for one client call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// A request/response client for one service address.
pub struct RpcClient<Req, Resp> {
    addr: String,
    timeout: Duration,
    codec: JsonCodec,
    next_seq: AtomicU64,
    _marker: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> RpcClient<Req, Resp>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: DEFAULT_CALL_TIMEOUT,
            codec: JsonCodec,
            next_seq: AtomicU64::new(1),
            _marker: PhantomData,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Sends `request` and waits for its response.
    ///
    /// # Errors
    /// - [`RoomgateError::DeadlineExceeded`] if the round trip takes too long
    /// - [`RoomgateError::Transport`] if dialing or I/O fails
    /// - [`RoomgateError::Protocol`] if the reply can't be decoded or
    ///   answers a different `seq`
    pub async fn call(&self, request: Req) -> Result<Resp, RoomgateError> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        match tokio::time::timeout(self.timeout, self.round_trip(seq, request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(addr = %self.addr, seq, "call timed out");
                Err(RoomgateError::DeadlineExceeded(self.timeout))
            }
        }
    }

    async fn round_trip(&self, seq: u64, request: Req) -> Result<Resp, RoomgateError> {
        let conn = WebSocketConnection::connect(&self.addr).await?;
        let bytes = self.codec.encode(&Envelope::new(seq, request))?;
        conn.send(&bytes).await?;

        let data = conn.recv().await?.ok_or(TransportError::Closed)?;
        let _ = conn.close().await;

        let reply: Envelope<Resp> = self.codec.decode(&data)?;
        if reply.seq != seq {
            return Err(ProtocolError::InvalidMessage(format!(
                "reply seq {} does not match request seq {seq}",
                reply.seq
            ))
            .into());
        }
        Ok(reply.payload)
    }
}

fn ack_result(ack: Ack) -> Result<(), RoomgateError> {
    if ack.ok {
        Ok(())
    } else {
        Err(RoomgateError::Rejected(ack.message))
    }
}

fn fault_error(fault: Fault) -> RoomgateError {
    RoomgateError::Fault {
        code: fault.code,
        message: fault.message,
    }
}

fn mismatched(expected: &str) -> RoomgateError {
    ProtocolError::InvalidMessage(format!("expected a {expected} reply")).into()
}

// ---------------------------------------------------------------------------
// Room broker client
// ---------------------------------------------------------------------------

/// Client for the room broker.
///
/// Also serves as a session host's [`RoomStateSource`].
pub struct RoomClient {
    rpc: RpcClient<RoomRequest, RoomResponse>,
}

impl RoomClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            rpc: RpcClient::new(addr),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            rpc: self.rpc.with_timeout(timeout),
        }
    }

    pub fn addr(&self) -> &str {
        self.rpc.addr()
    }

    /// Sends a raw request and returns the raw response.
    pub async fn call(&self, request: RoomRequest) -> Result<RoomResponse, RoomgateError> {
        self.rpc.call(request).await
    }

    /// Opens a room owned by `owner`. An empty `map_id` selects the
    /// broker's default map.
    pub async fn create_room(
        &self,
        owner: PlayerId,
        map_id: &str,
    ) -> Result<RoomId, RoomgateError> {
        let request = RoomRequest::CreateRoom {
            owner,
            map_id: map_id.to_string(),
        };
        match self.call(request).await? {
            RoomResponse::CreateRoom(reply) if reply.ok => Ok(reply.room_id),
            RoomResponse::CreateRoom(reply) => Err(RoomgateError::Rejected(format!(
                "room {} was not created",
                reply.room_id
            ))),
            RoomResponse::Fault(fault) => Err(fault_error(fault)),
            _ => Err(mismatched("CreateRoom")),
        }
    }

    pub async fn join_room(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
    ) -> Result<(), RoomgateError> {
        match self.call(RoomRequest::JoinRoom { room_id, player_id }).await? {
            RoomResponse::JoinRoom(ack) => ack_result(ack),
            RoomResponse::Fault(fault) => Err(fault_error(fault)),
            _ => Err(mismatched("JoinRoom")),
        }
    }

    pub async fn room_state(&self, room_id: RoomId) -> Result<RoomSnapshot, RoomgateError> {
        match self.call(RoomRequest::GetRoomState { room_id }).await? {
            RoomResponse::GetRoomState(reply) => match reply.room {
                Some(room) if reply.ok => Ok(room),
                _ => Err(RoomgateError::Rejected(reply.message)),
            },
            RoomResponse::Fault(fault) => Err(fault_error(fault)),
            _ => Err(mismatched("GetRoomState")),
        }
    }

    /// Asks the broker to hand the room over to a session host.
    pub async fn start_game(
        &self,
        room_id: RoomId,
        requester: PlayerId,
    ) -> Result<SessionAssignment, RoomgateError> {
        match self.call(RoomRequest::StartGame { room_id, requester }).await? {
            RoomResponse::StartGame(reply) => match reply.assignment {
                Some(assignment) if reply.ok => Ok(assignment),
                _ => Err(RoomgateError::Rejected(reply.message)),
            },
            RoomResponse::Fault(fault) => Err(fault_error(fault)),
            _ => Err(mismatched("StartGame")),
        }
    }

    pub async fn set_readiness(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        state: ReadinessState,
    ) -> Result<(), RoomgateError> {
        let request = RoomRequest::SetReadiness {
            room_id,
            player_id,
            state,
        };
        match self.call(request).await? {
            RoomResponse::SetReadiness(ack) => ack_result(ack),
            RoomResponse::Fault(fault) => Err(fault_error(fault)),
            _ => Err(mismatched("SetReadiness")),
        }
    }
}

impl RoomStateSource for RoomClient {
    async fn fetch_room(&self, room_id: &RoomId) -> Result<RoomSnapshot, SessionError> {
        match self.room_state(room_id.clone()).await {
            Ok(room) => Ok(room),
            Err(RoomgateError::Rejected(_)) => Err(SessionError::RoomNotFound(room_id.clone())),
            Err(e) => Err(SessionError::UpstreamUnavailable(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Session host client
// ---------------------------------------------------------------------------

/// Client for one session host.
pub struct SessionClient {
    rpc: RpcClient<SessionRequest, SessionResponse>,
}

impl SessionClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            rpc: RpcClient::new(addr),
        }
    }

    /// Connects to the host named in a broker's [`SessionAssignment`].
    pub fn for_assignment(assignment: &SessionAssignment) -> Self {
        Self::new(assignment.host.to_string())
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            rpc: self.rpc.with_timeout(timeout),
        }
    }

    pub fn addr(&self) -> &str {
        self.rpc.addr()
    }

    pub async fn call(&self, request: SessionRequest) -> Result<SessionResponse, RoomgateError> {
        self.rpc.call(request).await
    }

    /// Creates the session and hydrates it from the room broker.
    pub async fn create_game(
        &self,
        session_id: SessionId,
        room_id: RoomId,
    ) -> Result<(), RoomgateError> {
        let request = SessionRequest::CreateGameWithInstance {
            session_id,
            room_id,
        };
        match self.call(request).await? {
            SessionResponse::CreateGameWithInstance(ack) => ack_result(ack),
            SessionResponse::Fault(fault) => Err(fault_error(fault)),
            _ => Err(mismatched("CreateGameWithInstance")),
        }
    }

    /// Reads the roster. Rejected outside the read window.
    pub async fn game_state(&self, session_id: SessionId) -> Result<GameSnapshot, RoomgateError> {
        match self.call(SessionRequest::GetGameState { session_id }).await? {
            SessionResponse::GetGameState(reply) => match reply.state {
                Some(state) if reply.ok => Ok(GameSnapshot {
                    state,
                    players: reply.players,
                }),
                _ => Err(RoomgateError::Rejected(reply.message)),
            },
            SessionResponse::Fault(fault) => Err(fault_error(fault)),
            _ => Err(mismatched("GetGameState")),
        }
    }

    /// Replaces one player's state. Rejected outside the write window.
    pub async fn post_game_state(
        &self,
        session_id: SessionId,
        player: PlayerInfo,
    ) -> Result<(), RoomgateError> {
        match self
            .call(SessionRequest::PostGameState { session_id, player })
            .await?
        {
            SessionResponse::PostGameState(ack) => ack_result(ack),
            SessionResponse::Fault(fault) => Err(fault_error(fault)),
            _ => Err(mismatched("PostGameState")),
        }
    }
}
