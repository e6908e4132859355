//! Error types for the protocol layer.
//!
//! Each crate in Roomgate defines its own error enum. A `ProtocolError`
//! always means the bytes could not be turned into a message (or back),
//! never that the message itself was refused.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `method` tag, or
    /// missing required fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is well-formed but violates the RPC exchange, e.g. a
    /// reply whose `seq` doesn't match the request.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
