//! Live session management for Roomgate session hosts.
//!
//! This crate handles a match once the room broker has handed it off:
//!
//! 1. **Bootstrap** — fetching the room roster from the broker exactly
//!    once ([`BootstrapCoordinator`], [`RoomStateSource`])
//! 2. **Session tracking** — rosters and per-player state
//!    ([`SessionRegistry`], [`PlayerState`])
//! 3. **Access windows** — alternating write/read intervals that order
//!    client traffic without locks ([`AccessWindowGate`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Session service (above)  ← RPC façade, one mutex around the registry
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol layer (below)  ← SessionId, PlayerInfo, RoomSnapshot
//! ```

mod bootstrap;
mod config;
mod error;
mod registry;
mod session;
mod window;

pub use bootstrap::{BootstrapCoordinator, RoomStateSource};
pub use config::{BootstrapConfig, SessionConfig};
pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{
    DEFAULT_PROFESSION, GameSnapshot, PlayerState, STARTING_ACTION,
    STARTING_HEALTH, Session,
};
pub use window::{Access, AccessWindowGate};
