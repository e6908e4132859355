//! Unified error type for Roomgate services and clients.

use std::time::Duration;

use roomgate_protocol::ProtocolError;
use roomgate_room::RoomError;
use roomgate_session::SessionError;
use roomgate_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Client calls distinguish three failure shapes: the call never
/// completed (`Transport`, `DeadlineExceeded`), the server couldn't
/// parse it (`Fault`), or the server answered `ok=false` (`Rejected`).
#[derive(Debug, thiserror::Error)]
pub enum RoomgateError {
    /// A transport-level error (dial, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, mismatched reply).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room registry error.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A session registry error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The call didn't complete within its deadline.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// The server handled the call and answered `ok=false`.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The server couldn't decode the request.
    #[error("fault {code}: {message}")]
    Fault { code: u16, message: String },
}
