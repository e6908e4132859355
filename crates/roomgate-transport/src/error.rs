use std::io;

/// Boxed error from the underlying protocol library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listening socket couldn't be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// An accepted socket didn't complete the protocol handshake.
    #[error("handshake failed: {0}")]
    Handshake(#[source] BoxError),

    /// Dialing a remote peer failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: BoxError,
    },

    #[error("send failed: {0}")]
    Send(#[source] BoxError),

    #[error("receive failed: {0}")]
    Receive(#[source] BoxError),

    /// The peer went away before the expected message arrived.
    #[error("connection closed by peer")]
    Closed,
}
