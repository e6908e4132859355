//! Session and per-player live state.

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use roomgate_protocol::{
    Liveness, PlayerId, PlayerInfo, Position, RoomId, SessionLifecycleState,
};

/// Health every player starts a match with.
pub const STARTING_HEALTH: i64 = 100;

/// Profession assigned at hydration, before the client picks one.
pub const DEFAULT_PROFESSION: &str = "warrior";

/// Action label assigned at hydration.
pub const STARTING_ACTION: &str = "start";

/// One player's live state inside a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub player_id: PlayerId,
    pub health: i64,
    pub profession_id: String,
    pub position: Position,
    pub action: String,
    pub liveness: Liveness,
    pub items: BTreeSet<String>,
}

impl PlayerState {
    /// The state a player is given when the session is hydrated.
    pub fn starting(player_id: PlayerId) -> Self {
        Self {
            player_id,
            health: STARTING_HEALTH,
            profession_id: DEFAULT_PROFESSION.to_string(),
            position: Position::default(),
            action: STARTING_ACTION.to_string(),
            liveness: Liveness::Alive,
            items: BTreeSet::new(),
        }
    }

    pub fn to_info(&self) -> PlayerInfo {
        PlayerInfo {
            player_id: self.player_id.clone(),
            health: self.health,
            profession_id: self.profession_id.clone(),
            position: self.position,
            action: self.action.clone(),
            liveness: self.liveness,
            item_ids: self.items.iter().cloned().collect(),
        }
    }
}

impl From<PlayerInfo> for PlayerState {
    fn from(info: PlayerInfo) -> Self {
        Self {
            player_id: info.player_id,
            health: info.health,
            profession_id: info.profession_id,
            position: info.position,
            action: info.action,
            liveness: info.liveness,
            items: info.item_ids.into_iter().collect(),
        }
    }
}

/// A live match on this host.
#[derive(Debug, Clone)]
pub struct Session {
    pub room_id: RoomId,
    pub state: SessionLifecycleState,
    /// Set when the roster is hydrated; the access windows count from here.
    pub started_at: Option<Instant>,
    /// Last `GetGameState`/`PostGameState` against this session.
    pub last_access: Instant,
    pub players: HashMap<PlayerId, PlayerState>,
}

impl Session {
    /// A placeholder registered before the roster arrives.
    pub fn loading(room_id: RoomId, now: Instant) -> Self {
        Self {
            room_id,
            state: SessionLifecycleState::Loading,
            started_at: None,
            last_access: now,
            players: HashMap::new(),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut players: Vec<PlayerInfo> =
            self.players.values().map(PlayerState::to_info).collect();
        players.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        GameSnapshot {
            state: self.state,
            players,
        }
    }
}

/// What `GetGameState` returns: lifecycle state and the full roster,
/// sorted by player ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub state: SessionLifecycleState,
    pub players: Vec<PlayerInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_player_defaults() {
        let p = PlayerState::starting(PlayerId::from("alice"));
        assert_eq!(p.health, 100);
        assert_eq!(p.position, Position { x: 0, y: 0 });
        assert_eq!(p.action, "start");
        assert_eq!(p.liveness, Liveness::Alive);
        assert!(p.items.is_empty());
    }

    #[test]
    fn test_from_player_info_collapses_duplicate_items() {
        let info = PlayerInfo {
            player_id: PlayerId::from("bob"),
            health: 70,
            profession_id: "mage".into(),
            position: Position { x: 3, y: 4 },
            action: "cast".into(),
            liveness: Liveness::Alive,
            item_ids: vec!["potion".into(), "staff".into(), "potion".into()],
        };
        let state = PlayerState::from(info);
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.to_info().item_ids, vec!["potion", "staff"]);
    }
}
