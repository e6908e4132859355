//! Pre-match room management for the Roomgate room broker.
//!
//! A room collects players before a match. Its owner starts it, which
//! moves it to `Loading` and names the session host that will run the
//! live match.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — the table of rooms and every lobby operation
//! - [`Room`] — one lobby and its readiness map
//! - [`RoomIdAllocator`] — monotonic IDs with wraparound
//! - [`HostDirectory`] — where started rooms are placed
//! - [`RoomConfig`] — defaults and the ID ceiling

mod allocator;
mod config;
mod directory;
mod error;
mod registry;
mod room;

pub use allocator::{Allocation, RoomIdAllocator};
pub use config::RoomConfig;
pub use directory::{FixedHostDirectory, HostDirectory};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::Room;
