//! Session host configuration.

use std::time::Duration;

use crate::AccessWindowGate;

/// Configuration for the session registry.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Read/write window schedule applied to every session.
    pub window: AccessWindowGate,

    /// Sessions with no `GetGameState`/`PostGameState` for this long
    /// are removed by [`SessionRegistry::reap_idle`](crate::SessionRegistry::reap_idle).
    pub idle_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: AccessWindowGate::default(),
            idle_ttl: Duration::from_secs(600),
        }
    }
}

/// Configuration for hydrating sessions from the room broker.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Deadline for the whole `GetRoomState` round trip.
    pub upstream_timeout: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(10),
        }
    }
}
