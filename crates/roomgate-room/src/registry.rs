//! The room registry: the broker's table of rooms.
//!
//! # Concurrency note
//!
//! `RoomRegistry` is not internally synchronized for its room table; the
//! broker wraps it in a mutex and holds the lock for exactly one
//! operation. The ID allocator inside it is atomic on its own.

use std::collections::HashMap;

use roomgate_protocol::{
    PlayerId, ReadinessState, RoomId, RoomSnapshot, SessionAssignment,
};

use crate::{
    FixedHostDirectory, HostDirectory, Room, RoomConfig, RoomError,
    RoomIdAllocator,
};

/// All rooms known to the broker, plus the ID allocator and placement
/// policy used to create and start them.
pub struct RoomRegistry<D: HostDirectory = FixedHostDirectory> {
    rooms: HashMap<RoomId, Room>,
    ids: RoomIdAllocator,
    directory: D,
    config: RoomConfig,
}

impl<D: HostDirectory> RoomRegistry<D> {
    pub fn new(config: RoomConfig, directory: D) -> Self {
        Self {
            rooms: HashMap::new(),
            ids: RoomIdAllocator::new(config.id_ceiling),
            directory,
            config,
        }
    }

    /// Opens a new room owned by `owner` and returns its ID.
    ///
    /// Always succeeds. An empty `map_id` falls back to the configured
    /// default. If the allocation wraps the ID counter, every room from
    /// the previous epoch is discarded first.
    pub fn create_room(&mut self, owner: PlayerId, map_id: &str) -> RoomId {
        let allocation = self.ids.next();
        if allocation.epoch_reset {
            let purged = self.rooms.len();
            self.rooms.clear();
            tracing::warn!(purged, "room ID ceiling reached, new ID epoch started");
        }

        let room_id = RoomId::from(allocation.id);
        let map_id = if map_id.is_empty() {
            self.config.default_map_id.clone()
        } else {
            map_id.to_string()
        };
        let room = Room::new(room_id.clone(), owner, map_id, self.config.capacity);
        tracing::info!(%room_id, owner = %room.owner(), "room created");
        self.rooms.insert(room_id.clone(), room);
        room_id
    }

    /// Seats `player` in a waiting room.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] — unknown room
    /// - [`RoomError::InvalidState`] — the room is no longer `Waiting`
    /// - [`RoomError::AlreadyMember`] — the player already has a seat
    pub fn join_room(
        &mut self,
        room_id: &RoomId,
        player: PlayerId,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(room_id)?;
        let player_id = player.clone();
        room.admit(player)?;
        tracing::info!(
            %room_id,
            %player_id,
            members = room.member_count(),
            "player joined room"
        );
        Ok(())
    }

    /// Returns a snapshot of the room. Never mutates it.
    pub fn room_state(&self, room_id: &RoomId) -> Result<RoomSnapshot, RoomError> {
        self.rooms
            .get(room_id)
            .map(Room::snapshot)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Hands the room over to a session host.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] — unknown room
    /// - [`RoomError::PermissionDenied`] — `requester` isn't the owner;
    ///   the room is left untouched
    /// - [`RoomError::InvalidState`] — the room is already `InGame`
    pub fn start_game(
        &mut self,
        room_id: &RoomId,
        requester: &PlayerId,
    ) -> Result<SessionAssignment, RoomError> {
        let directory = &self.directory;
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let assignment = room.start(requester, |id| SessionAssignment {
            host: directory.assign(id),
            session_id: id.session_id(),
        })?;

        tracing::info!(
            %room_id,
            session_id = %assignment.session_id,
            host = %assignment.host,
            "room handed off to session host"
        );
        Ok(assignment)
    }

    /// Updates a member's lobby status.
    pub fn set_readiness(
        &mut self,
        room_id: &RoomId,
        player: &PlayerId,
        state: ReadinessState,
    ) -> Result<(), RoomError> {
        self.room_mut(room_id)?.set_readiness(player, state)?;
        tracing::debug!(%room_id, player_id = %player, ?state, "readiness changed");
        Ok(())
    }

    /// Administrative reset: restarts the ID counter and drops every room.
    ///
    /// All previously issued room IDs become invalid. Returns how many
    /// rooms were dropped.
    pub fn reset(&mut self) -> usize {
        let purged = self.rooms.len();
        self.rooms.clear();
        self.ids.reset();
        tracing::warn!(purged, "room registry reset");
        purged
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Returns the number of rooms in the current epoch.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    fn room_mut(&mut self, room_id: &RoomId) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }
}

impl Default for RoomRegistry<FixedHostDirectory> {
    fn default() -> Self {
        Self::new(RoomConfig::default(), FixedHostDirectory::default())
    }
}

#[cfg(test)]
mod tests {
    use roomgate_protocol::RoomLifecycleState;

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    #[test]
    fn test_create_room_first_id_is_one() {
        let mut rooms: RoomRegistry = RoomRegistry::default();
        assert_eq!(rooms.create_room(pid("alice"), ""), RoomId::from(1));
    }

    #[test]
    fn test_create_room_empty_map_uses_default() {
        let mut rooms: RoomRegistry = RoomRegistry::default();
        let id = rooms.create_room(pid("alice"), "");
        assert_eq!(rooms.room_state(&id).unwrap().map_id, "000");
    }

    #[test]
    fn test_create_room_named_map_is_kept() {
        let mut rooms: RoomRegistry = RoomRegistry::default();
        let id = rooms.create_room(pid("alice"), "testmap0");
        assert_eq!(rooms.room_state(&id).unwrap().map_id, "testmap0");
    }

    #[test]
    fn test_create_room_epoch_reset_purges_old_rooms() {
        let config = RoomConfig {
            id_ceiling: 3,
            ..RoomConfig::default()
        };
        let mut rooms = RoomRegistry::new(config, FixedHostDirectory::default());
        rooms.create_room(pid("a"), "");
        rooms.create_room(pid("b"), "");
        assert_eq!(rooms.len(), 2);

        let wrapped = rooms.create_room(pid("c"), "");
        assert_eq!(wrapped, RoomId::from(0));
        assert_eq!(rooms.len(), 1);
        assert!(matches!(
            rooms.room_state(&RoomId::from(1)),
            Err(RoomError::NotFound(_))
        ));
    }

    #[test]
    fn test_set_readiness_member_updates_state() {
        let mut rooms: RoomRegistry = RoomRegistry::default();
        let id = rooms.create_room(pid("alice"), "");
        rooms
            .set_readiness(&id, &pid("alice"), ReadinessState::Ready)
            .unwrap();
        let room = rooms.get(&id).unwrap();
        assert_eq!(room.readiness(&pid("alice")), Some(ReadinessState::Ready));
    }

    #[test]
    fn test_start_game_unknown_room_returns_not_found() {
        let mut rooms: RoomRegistry = RoomRegistry::default();
        let err = rooms.start_game(&RoomId::from(9), &pid("a")).unwrap_err();
        assert!(matches!(err, RoomError::NotFound(_)));
    }

    #[test]
    fn test_start_game_records_directory_host() {
        let mut rooms =
            RoomRegistry::new(RoomConfig::default(), FixedHostDirectory::new("10.0.0.2", 7000));
        let id = rooms.create_room(pid("alice"), "");
        let assignment = rooms.start_game(&id, &pid("alice")).unwrap();
        assert_eq!(assignment.host.to_string(), "10.0.0.2:7000");
        assert_eq!(
            rooms.room_state(&id).unwrap().state,
            RoomLifecycleState::Loading
        );
    }

    #[test]
    fn test_reset_drops_rooms_and_restarts_ids() {
        let mut rooms: RoomRegistry = RoomRegistry::default();
        rooms.create_room(pid("a"), "");
        rooms.create_room(pid("b"), "");
        assert_eq!(rooms.reset(), 2);
        assert!(rooms.is_empty());
        assert_eq!(rooms.create_room(pid("c"), ""), RoomId::from(1));
    }
}
