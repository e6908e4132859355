//! Wire protocol for Roomgate.
//!
//! This crate defines the "language" spoken between clients, the room
//! broker and session hosts:
//!
//! - **Types** ([`RoomId`], [`PlayerInfo`], [`RoomSnapshot`], etc.) —
//!   identities and the data model as it appears on the wire.
//! - **RPC messages** ([`RoomRequest`]/[`RoomResponse`],
//!   [`SessionRequest`]/[`SessionResponse`]) wrapped in an [`Envelope`].
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how envelopes become
//!   bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope<Request>) → Service (registry)
//! ```

mod codec;
mod error;
mod rpc;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use rpc::{
    Ack, CreateRoomReply, Fault, GameStateReply, RoomRequest, RoomResponse,
    RoomStateReply, SessionRequest, SessionResponse, StartGameReply,
};
pub use types::{
    Envelope, Liveness, PlayerId, PlayerInfo, Position, ReadinessState,
    RoomId, RoomLifecycleState, RoomMember, RoomSnapshot, SessionAssignment,
    SessionHost, SessionId, SessionLifecycleState,
};
