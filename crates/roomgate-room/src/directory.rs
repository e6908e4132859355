//! Session host placement.
//!
//! When a room starts, the broker must name a session host that will run
//! the match. Which host is a placement decision outside the room
//! registry, so it sits behind the [`HostDirectory`] trait.

use roomgate_protocol::{RoomId, SessionHost};

/// Picks a reachable session host for a room that is starting.
pub trait HostDirectory: Send + Sync + 'static {
    /// Returns the host that should run `room_id`'s session.
    fn assign(&self, room_id: &RoomId) -> SessionHost;
}

/// Sends every room to the same session host.
#[derive(Debug, Clone)]
pub struct FixedHostDirectory {
    host: SessionHost,
}

impl FixedHostDirectory {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: SessionHost {
                host: host.into(),
                port,
            },
        }
    }
}

impl Default for FixedHostDirectory {
    fn default() -> Self {
        Self::new("127.0.0.1", 8333)
    }
}

impl HostDirectory for FixedHostDirectory {
    fn assign(&self, _room_id: &RoomId) -> SessionHost {
        self.host.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_directory_assigns_same_host_to_every_room() {
        let dir = FixedHostDirectory::new("10.1.2.3", 9000);
        let a = dir.assign(&RoomId::from(1));
        let b = dir.assign(&RoomId::from(2));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "10.1.2.3:9000");
    }
}
