//! A single pre-match room.

use std::collections::HashMap;

use roomgate_protocol::{
    PlayerId, ReadinessState, RoomId, RoomLifecycleState, RoomMember,
    RoomSnapshot, SessionAssignment,
};

use crate::RoomError;

/// Lobby state for one room.
///
/// Invariant: the owner always has a readiness entry. Nothing removes
/// entries, so seeding it in [`Room::new`] is enough.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    map_id: String,
    capacity: u32,
    owner: PlayerId,
    readiness: HashMap<PlayerId, ReadinessState>,
    state: RoomLifecycleState,
    assignment: Option<SessionAssignment>,
}

impl Room {
    /// Opens a room in `Waiting` with the owner seated as `Unready`.
    pub fn new(id: RoomId, owner: PlayerId, map_id: String, capacity: u32) -> Self {
        let mut readiness = HashMap::new();
        readiness.insert(owner.clone(), ReadinessState::Unready);
        Self {
            id,
            map_id,
            capacity,
            owner,
            readiness,
            state: RoomLifecycleState::Waiting,
            assignment: None,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn owner(&self) -> &PlayerId {
        &self.owner
    }

    pub fn state(&self) -> RoomLifecycleState {
        self.state
    }

    pub fn assignment(&self) -> Option<&SessionAssignment> {
        self.assignment.as_ref()
    }

    pub fn member_count(&self) -> usize {
        self.readiness.len()
    }

    pub fn readiness(&self, player: &PlayerId) -> Option<ReadinessState> {
        self.readiness.get(player).copied()
    }

    /// Seats a new player as `Unready`.
    ///
    /// Capacity is deliberately not consulted.
    pub(crate) fn admit(&mut self, player: PlayerId) -> Result<(), RoomError> {
        if !self.state.is_joinable() {
            return Err(self.invalid_state("join"));
        }
        if self.readiness.contains_key(&player) {
            return Err(RoomError::AlreadyMember(player, self.id.clone()));
        }
        self.readiness.insert(player, ReadinessState::Unready);
        Ok(())
    }

    pub(crate) fn set_readiness(
        &mut self,
        player: &PlayerId,
        state: ReadinessState,
    ) -> Result<(), RoomError> {
        match self.readiness.get_mut(player) {
            Some(slot) => {
                *slot = state;
                Ok(())
            }
            None => Err(RoomError::NotMember(player.clone(), self.id.clone())),
        }
    }

    /// Moves the room to `Loading` and records where its session runs.
    ///
    /// Only ownership is checked; membership and readiness never gate a
    /// start. A second start while `Loading` keeps the first assignment,
    /// so the derived session ID stays stable.
    pub(crate) fn start(
        &mut self,
        requester: &PlayerId,
        assign: impl FnOnce(&RoomId) -> SessionAssignment,
    ) -> Result<SessionAssignment, RoomError> {
        if *requester != self.owner {
            return Err(RoomError::PermissionDenied {
                player: requester.clone(),
                room_id: self.id.clone(),
            });
        }
        match (self.state, &self.assignment) {
            (RoomLifecycleState::Loading, Some(existing)) => Ok(existing.clone()),
            (RoomLifecycleState::InGame, _) => Err(self.invalid_state("start")),
            _ => {
                let assignment = assign(&self.id);
                self.state = RoomLifecycleState::Loading;
                self.assignment = Some(assignment.clone());
                Ok(assignment)
            }
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let mut members: Vec<RoomMember> = self
            .readiness
            .iter()
            .map(|(player_id, state)| RoomMember {
                player_id: player_id.clone(),
                state: *state,
            })
            .collect();
        members.sort_by(|a, b| a.player_id.cmp(&b.player_id));

        RoomSnapshot {
            room_id: self.id.clone(),
            map_id: self.map_id.clone(),
            capacity: self.capacity,
            owner: self.owner.clone(),
            state: self.state,
            members,
            assignment: self.assignment.clone(),
        }
    }

    fn invalid_state(&self, operation: &'static str) -> RoomError {
        RoomError::InvalidState {
            room_id: self.id.clone(),
            state: self.state,
            operation,
        }
    }
}
