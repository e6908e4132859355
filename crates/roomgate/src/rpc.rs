//! Request/response plumbing shared by both services.
//!
//! A [`Service`] turns one decoded request into one response. The
//! [`handle_connection`] loop owns the socket: it reads envelopes, hands
//! each payload to the service, and writes the reply back under the same
//! `seq`. Connections run concurrently; calls on one connection are
//! answered in order.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use roomgate_protocol::{Codec, Envelope};
use roomgate_transport::{Connection, WebSocketConnection};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::RoomgateError;

/// An RPC service: the broker's room service or a host's session service.
pub trait Service: Send + Sync + 'static {
    type Request: DeserializeOwned + Send;
    type Response: Serialize + Send;

    /// Handles one request. Failures are expressed inside the response
    /// (`ok=false`), never as an `Err`.
    fn handle(
        &self,
        request: Self::Request,
    ) -> impl Future<Output = Self::Response> + Send;

    /// Builds the reply for a request that couldn't be decoded.
    fn fault(code: u16, message: String) -> Self::Response;
}

/// Just the `seq` of an envelope whose payload failed to decode, so the
/// fault reply can still be correlated.
#[derive(Deserialize)]
struct SeqOnly {
    seq: u64,
}

/// Serves one connection until the peer closes it or goes idle.
pub(crate) async fn handle_connection<S, C>(
    conn: WebSocketConnection,
    service: Arc<S>,
    codec: Arc<C>,
    idle_timeout: Duration,
) -> Result<(), RoomgateError>
where
    S: Service,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    loop {
        let data = match tokio::time::timeout(idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::debug!(%conn_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let reply = match codec.decode::<Envelope<S::Request>>(&data) {
            Ok(request) => {
                let response = service.handle(request.payload).await;
                Envelope::new(request.seq, response)
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode request");
                let seq = codec.decode::<SeqOnly>(&data).map(|s| s.seq).unwrap_or(0);
                Envelope::new(seq, S::fault(400, format!("invalid request: {e}")))
            }
        };

        let bytes = codec.encode(&reply)?;
        conn.send(&bytes).await?;
    }

    Ok(())
}
