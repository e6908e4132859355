//! Room broker configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the room registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Map used when `CreateRoom` doesn't name one.
    pub default_map_id: String,

    /// Seats per room. Stored on every room and reported by
    /// `GetRoomState`; joins are not checked against it.
    pub capacity: u32,

    /// The room ID counter wraps to 0 once it reaches this value,
    /// starting a new ID epoch.
    pub id_ceiling: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            default_map_id: "000".to_string(),
            capacity: 8,
            id_ceiling: 100_000,
        }
    }
}
