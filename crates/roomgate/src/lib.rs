//! # Roomgate
//!
//! Room broker and session hosts for handing multiplayer matches off
//! from a lobby to the server that runs them.
//!
//! - The **room broker** ([`RoomService`]) creates rooms, admits players
//!   and, when the owner starts the game, assigns a session host.
//! - A **session host** ([`SessionService`]) hydrates the session from
//!   the broker once, then serves reads and writes that alternate in
//!   fixed time windows.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomgate::prelude::*;
//!
//! # async fn run() -> Result<(), RoomgateError> {
//! let broker = RoomServerBuilder::new()
//!     .bind("127.0.0.1:8555")
//!     .build(FixedHostDirectory::new("127.0.0.1", 8333))
//!     .await?;
//! let host = SessionServerBuilder::new()
//!     .bind("127.0.0.1:8333")
//!     .broker("127.0.0.1:8555")
//!     .build()
//!     .await?;
//! tokio::spawn(broker.run());
//! host.run().await
//! # }
//! ```

mod client;
mod error;
mod room_service;
mod rpc;
mod server;
mod session_service;

pub use client::{DEFAULT_CALL_TIMEOUT, RoomClient, RpcClient, SessionClient};
pub use error::RoomgateError;
pub use room_service::RoomService;
pub use rpc::Service;
pub use server::{
    DEFAULT_BROKER_ADDR, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_IDLE_TIMEOUT,
    DEFAULT_REAP_INTERVAL, DEFAULT_SESSION_HOST_ADDR, MIN_REAP_INTERVAL,
    RoomServer, RoomServerBuilder, RpcServer, SessionServer,
    SessionServerBuilder,
};
pub use session_service::SessionService;

pub use roomgate_protocol as protocol;
pub use roomgate_room as room;
pub use roomgate_session as session;
pub use roomgate_transport as transport;

/// Everything needed to run or call a broker and session host.
pub mod prelude {
    pub use crate::{
        RoomClient, RoomServerBuilder, RoomService, RoomgateError, Service,
        SessionClient, SessionServerBuilder, SessionService,
    };
    pub use roomgate_protocol::{
        Liveness, PlayerId, PlayerInfo, Position, ReadinessState, RoomId,
        RoomLifecycleState, RoomSnapshot, SessionAssignment, SessionHost,
        SessionId, SessionLifecycleState,
    };
    pub use roomgate_room::{FixedHostDirectory, HostDirectory, RoomConfig};
    pub use roomgate_session::{
        AccessWindowGate, BootstrapConfig, GameSnapshot, SessionConfig,
    };
}
