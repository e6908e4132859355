//! Server builders and the accept loop.
//!
//! Both processes share one loop: accept a TCP peer and spawn a task
//! that finishes the WebSocket handshake under a deadline, then runs
//! [`handle_connection`] against the shared service. The loop itself
//! never waits on a peer. What differs is the service each builder
//! assembles.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use roomgate_protocol::JsonCodec;
use roomgate_room::{FixedHostDirectory, HostDirectory, RoomConfig, RoomRegistry};
use roomgate_session::{BootstrapConfig, SessionConfig};
use roomgate_transport::{
    PendingConnection, PendingWebSocket, Transport, WebSocketTransport,
};

use crate::client::RoomClient;
use crate::room_service::RoomService;
use crate::rpc::{Service, handle_connection};
use crate::session_service::{SessionService, spawn_reaper};
use crate::RoomgateError;

/// Connections with no request for this long are closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Peers must finish the WebSocket handshake within this long.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// How often a session host sweeps for idle sessions.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(30);

/// Shorter reap intervals are raised to this.
pub const MIN_REAP_INTERVAL: Duration = Duration::from_millis(100);

/// Pause after a failed `accept` (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Default address of the room broker.
pub const DEFAULT_BROKER_ADDR: &str = "127.0.0.1:8555";

/// Default address of a session host.
pub const DEFAULT_SESSION_HOST_ADDR: &str = "127.0.0.1:8333";

/// A bound RPC server for one [`Service`].
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RpcServer<S: Service> {
    transport: WebSocketTransport,
    service: Arc<S>,
    codec: Arc<JsonCodec>,
    idle_timeout: Duration,
    handshake_timeout: Duration,
}

impl<S: Service> RpcServer<S> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The shared service instance every connection dispatches to.
    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Runs the accept loop until the task is dropped.
    pub async fn run(mut self) -> Result<(), RoomgateError> {
        tracing::info!(addr = ?self.local_addr().ok(), "server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let service = Arc::clone(&self.service);
                    let codec = Arc::clone(&self.codec);
                    tokio::spawn(serve_peer(
                        pending,
                        service,
                        codec,
                        self.handshake_timeout,
                        self.idle_timeout,
                    ));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

/// Completes one peer's handshake, then serves its requests.
async fn serve_peer<S: Service>(
    pending: PendingWebSocket,
    service: Arc<S>,
    codec: Arc<JsonCodec>,
    handshake_timeout: Duration,
    idle_timeout: Duration,
) {
    let peer = pending.peer_addr();
    let conn = match tokio::time::timeout(handshake_timeout, pending.upgrade()).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            tracing::debug!(%peer, error = %e, "handshake failed");
            return;
        }
        Err(_) => {
            tracing::debug!(%peer, "handshake timed out");
            return;
        }
    };
    if let Err(e) = handle_connection(conn, service, codec, idle_timeout).await {
        tracing::debug!(%peer, error = %e, "connection ended with error");
    }
}

/// The room broker.
pub type RoomServer<D = FixedHostDirectory> = RpcServer<RoomService<D>>;

/// A session host wired to a room broker over RPC.
pub type SessionServer = RpcServer<SessionService<RoomClient>>;

// ---------------------------------------------------------------------------
// Room broker
// ---------------------------------------------------------------------------

/// Builder for the room broker.
///
/// # Example
///
/// ```rust,no_run
/// use roomgate::prelude::*;
///
/// # async fn run() -> Result<(), RoomgateError> {
/// let server = RoomServerBuilder::new()
///     .bind("0.0.0.0:8555")
///     .build(FixedHostDirectory::new("10.0.0.5", 8333))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct RoomServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    idle_timeout: Duration,
    handshake_timeout: Duration,
}

impl RoomServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BROKER_ADDR.to_string(),
            room_config: RoomConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener. Started rooms are placed via `directory`.
    pub async fn build<D: HostDirectory>(
        self,
        directory: D,
    ) -> Result<RoomServer<D>, RoomgateError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let rooms = RoomRegistry::new(self.room_config, directory);

        Ok(RpcServer {
            transport,
            service: Arc::new(RoomService::new(rooms)),
            codec: Arc::new(JsonCodec),
            idle_timeout: self.idle_timeout,
            handshake_timeout: self.handshake_timeout,
        })
    }
}

impl Default for RoomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Session host
// ---------------------------------------------------------------------------

/// Builder for a session host.
pub struct SessionServerBuilder {
    bind_addr: String,
    broker_addr: String,
    session_config: SessionConfig,
    bootstrap_config: BootstrapConfig,
    idle_timeout: Duration,
    handshake_timeout: Duration,
    reap_interval: Duration,
}

impl SessionServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_SESSION_HOST_ADDR.to_string(),
            broker_addr: DEFAULT_BROKER_ADDR.to_string(),
            session_config: SessionConfig::default(),
            bootstrap_config: BootstrapConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            reap_interval: DEFAULT_REAP_INTERVAL,
        }
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Address of the room broker that sessions hydrate from.
    pub fn broker(mut self, addr: &str) -> Self {
        self.broker_addr = addr.to_string();
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn bootstrap_config(mut self, config: BootstrapConfig) -> Self {
        self.bootstrap_config = config;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets the idle-session sweep period, at least [`MIN_REAP_INTERVAL`].
    pub fn reap_interval(mut self, every: Duration) -> Self {
        self.reap_interval = every.max(MIN_REAP_INTERVAL);
        self
    }

    /// Binds the listener and starts the idle-session reaper.
    ///
    /// The reaper stops once the server and its service are dropped.
    pub async fn build(self) -> Result<SessionServer, RoomgateError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let broker = RoomClient::new(self.broker_addr)
            .with_timeout(self.bootstrap_config.upstream_timeout);
        let service = Arc::new(SessionService::new(
            broker,
            self.session_config,
            self.bootstrap_config,
        ));
        spawn_reaper(Arc::downgrade(&service), self.reap_interval);

        Ok(RpcServer {
            transport,
            service,
            codec: Arc::new(JsonCodec),
            idle_timeout: self.idle_timeout,
            handshake_timeout: self.handshake_timeout,
        })
    }
}

impl Default for SessionServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
