//! Message transport for Roomgate.
//!
//! The RPC layer only needs two things from the network: a listener that
//! yields connections ([`Transport`]) and a connection that moves whole
//! messages in order ([`Connection`]). Both the room broker and the
//! session hosts serve on a [`Transport`]; clients dial a
//! [`Connection`] per call.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::{BoxError, TransportError};
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identifier of a connection, used to correlate logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Hands out the next unused ID.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A bound listener.
pub trait Transport: Send + Sync + 'static {
    type Pending: PendingConnection<Error = Self::Error>;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer. Only the socket is accepted here; the
    /// protocol handshake is left to [`PendingConnection::upgrade`], so a
    /// slow peer never holds up the accept loop.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;

    /// The address peers should dial. Differs from the requested one
    /// when binding to port 0.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// An accepted peer whose handshake hasn't run yet.
pub trait PendingConnection: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Completes the handshake. Callers should bound this with a timeout:
    /// a peer that never speaks keeps it pending forever.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;

    fn peer_addr(&self) -> SocketAddr;
}

/// A single connection that can send and receive whole messages.
///
/// Messages are delivered reliably and in order; one `send` on one side
/// corresponds to exactly one `recv` on the other. `send` and `recv`
/// may run concurrently from different tasks.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message, or `Ok(None)` once the peer has closed
    /// the connection.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Starts the closing handshake.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}
