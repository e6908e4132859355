//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The RPC layer doesn't care HOW envelopes become bytes, only that
//! something implements [`Codec`]. [`JsonCodec`] is the only codec today;
//! a binary codec can be added later without touching the services.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection task of a server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use roomgate_protocol::{Codec, Envelope, JsonCodec, RoomId, RoomRequest};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(
///     7,
///     RoomRequest::GetRoomState { room_id: RoomId::from(1) },
/// );
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<RoomRequest> = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Envelope, SessionId, SessionRequest};

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<Envelope<SessionRequest>, _> =
            JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_unknown_method_returns_decode_error() {
        let bytes = br#"{"seq":1,"payload":{"method":"DeleteEverything","params":{}}}"#;
        let result: Result<Envelope<SessionRequest>, _> = JsonCodec.decode(bytes);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_preserves_seq() {
        let envelope = Envelope::new(
            42,
            SessionRequest::GetGameState {
                session_id: SessionId::from("1_GID"),
            },
        );
        let bytes = JsonCodec.encode(&envelope).expect("encode");
        let decoded: Envelope<SessionRequest> =
            JsonCodec.decode(&bytes).expect("decode");
        assert_eq!(decoded.seq, 42);
    }
}
