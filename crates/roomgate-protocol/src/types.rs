//! Core wire types: identities, lifecycle enums, and the data model
//! snapshots that travel between the room broker, session hosts and
//! clients.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A caller-supplied player identity.
///
/// Roomgate does no authentication: whatever string the caller sends is
/// the identity. The newtype keeps it from being mixed up with room or
/// session IDs in function signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A broker-assigned room identifier.
///
/// Always the decimal rendering of the allocator's counter, but carried
/// as a string so clients never do arithmetic on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Derives the session ID the broker hands out when this room starts.
    ///
    /// The mapping is deterministic, so a repeated start yields the same
    /// session ID.
    pub fn session_id(&self) -> SessionId {
        SessionId(format!("{}_GID", self.0))
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RoomId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifies a live session on a session host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle enums
// ---------------------------------------------------------------------------

/// Per-player lobby status inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReadinessState {
    #[default]
    Unready,
    Ready,
    Connecting,
    InGame,
    Watching,
}

/// The coarse stage of a room.
///
/// ```text
/// Waiting → Loading → InGame
/// ```
///
/// Monotonic: there is no way back to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomLifecycleState {
    Waiting,
    Loading,
    InGame,
}

impl RoomLifecycleState {
    /// Returns `true` if the room still accepts new members.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}

impl fmt::Display for RoomLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Loading => write!(f, "Loading"),
            Self::InGame => write!(f, "InGame"),
        }
    }
}

/// The coarse stage of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionLifecycleState {
    /// Registered, waiting for its roster from the room broker.
    Loading,
    /// Roster hydrated; reads and writes are window-gated.
    Playing,
}

impl fmt::Display for SessionLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading"),
            Self::Playing => write!(f, "Playing"),
        }
    }
}

/// Whether a player is still in the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Liveness {
    #[default]
    Alive,
    Dead,
}

// ---------------------------------------------------------------------------
// Room data
// ---------------------------------------------------------------------------

/// Network address of a session host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHost {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for SessionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Where a started room's match lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAssignment {
    pub host: SessionHost,
    pub session_id: SessionId,
}

/// One entry of a room's membership list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    pub player_id: PlayerId,
    pub state: ReadinessState,
}

/// A read-only copy of a room, as returned by `GetRoomState`.
///
/// `members` is sorted by player ID so snapshots compare and print
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub map_id: String,
    pub capacity: u32,
    pub owner: PlayerId,
    pub state: RoomLifecycleState,
    pub members: Vec<RoomMember>,
    /// Present once the room has been started.
    pub assignment: Option<SessionAssignment>,
}

// ---------------------------------------------------------------------------
// Session data
// ---------------------------------------------------------------------------

/// A 2-D integer map position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// A player's full live state as it appears on the wire.
///
/// `PostGameState` carries one of these and the session host replaces
/// the player's stored state with it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player_id: PlayerId,
    pub health: i64,
    pub profession_id: String,
    pub position: Position,
    pub action: String,
    pub liveness: Liveness,
    /// Item identifiers. Order carries no meaning and duplicates collapse.
    #[serde(default)]
    pub item_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Every RPC message on the wire is an `Envelope`.
///
/// A request's `seq` is chosen by the caller; the reply carries the same
/// `seq` so the caller can pair them up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<P> {
    pub seq: u64,
    pub payload: P,
}

impl<P> Envelope<P> {
    pub fn new(seq: u64, payload: P) -> Self {
        Self { seq, payload }
    }
}
