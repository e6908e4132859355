//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! Both directions use the same [`WebSocketConnection`]: the server side
//! wraps accepted sockets, the client side dials with
//! [`WebSocketConnection::connect`]. The socket is split into its sink
//! and stream halves, so a task parked in `recv` never blocks a `send`.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Connection, ConnectionId, PendingConnection, Transport, TransportError};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a listener to `addr` (`host:port`; port 0 picks a free one).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Pending = PendingWebSocket;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<PendingWebSocket, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;
        Ok(PendingWebSocket { stream, peer })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A TCP peer that hasn't sent its WebSocket upgrade request yet.
pub struct PendingWebSocket {
    stream: TcpStream,
    peer: SocketAddr,
}

impl PendingConnection for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn upgrade(self) -> Result<WebSocketConnection, TransportError> {
        let socket = tokio_tungstenite::accept_async(MaybeTlsStream::Plain(self.stream))
            .await
            .map_err(|e| TransportError::Handshake(e.into()))?;

        let conn = WebSocketConnection::from_socket(socket);
        tracing::debug!(id = %conn.id, peer = %self.peer, "accepted WebSocket connection");
        Ok(conn)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

/// One WebSocket connection, accepted or dialed.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<Socket, Message>>,
    stream: Mutex<SplitStream<Socket>>,
}

impl WebSocketConnection {
    /// Dials a remote peer at `addr` (`host:port`, no scheme).
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let (socket, _response) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .map_err(|e| TransportError::Connect {
                addr: addr.to_string(),
                source: e.into(),
            })?;

        let conn = Self::from_socket(socket);
        tracing::debug!(id = %conn.id, addr, "dialed WebSocket connection");
        Ok(conn)
    }

    fn from_socket(socket: Socket) -> Self {
        let (sink, stream) = socket.split();
        Self {
            id: ConnectionId::next(),
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .send(Message::binary(data.to_vec()))
            .await
            .map_err(|e| TransportError::Send(e.into()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut stream = self.stream.lock().await;
        while let Some(frame) = stream.next().await {
            match frame.map_err(|e| TransportError::Receive(e.into()))? {
                Message::Binary(data) => return Ok(Some(data.to_vec())),
                Message::Text(text) => return Ok(Some(text.as_bytes().to_vec())),
                Message::Close(_) => return Ok(None),
                // Control frames are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| TransportError::Send(e.into()))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
