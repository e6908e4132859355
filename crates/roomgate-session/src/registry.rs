//! The session registry: every live session on this host.
//!
//! # Concurrency note
//!
//! Like the room registry, `SessionRegistry` is a plain map. The session
//! host wraps it in a mutex and holds the lock for a single operation;
//! the bootstrap round trip to the room broker happens with the lock
//! released (see [`BootstrapCoordinator`](crate::BootstrapCoordinator)).
//!
//! Every time-dependent operation takes `now` explicitly so the window
//! schedule is deterministic under test.

use std::collections::HashMap;
use std::time::Instant;

use roomgate_protocol::{
    PlayerInfo, RoomId, RoomSnapshot, SessionId, SessionLifecycleState,
};

use crate::{
    Access, GameSnapshot, PlayerState, Session, SessionConfig, SessionError,
};

/// All sessions hosted here, keyed by session ID.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Registers a `Loading` placeholder for a session about to be
    /// bootstrapped.
    ///
    /// # Errors
    /// [`SessionError::AlreadyExists`] if the ID is taken, whether the
    /// existing session is still loading or already playing.
    pub fn reserve(
        &mut self,
        session_id: SessionId,
        room_id: RoomId,
        now: Instant,
    ) -> Result<(), SessionError> {
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::AlreadyExists(session_id));
        }
        tracing::debug!(%session_id, %room_id, "session placeholder registered");
        self.sessions.insert(session_id, Session::loading(room_id, now));
        Ok(())
    }

    /// Materializes a placeholder's roster from the room's membership.
    ///
    /// Every member gets a starting [`PlayerState`]; the session moves to
    /// `Playing` and its access windows start counting at `now`.
    pub fn hydrate(
        &mut self,
        session_id: &SessionId,
        room: &RoomSnapshot,
        now: Instant,
    ) -> Result<(), SessionError> {
        let session = self.session_mut(session_id)?;
        if session.state != SessionLifecycleState::Loading {
            return Err(SessionError::InvalidState {
                session_id: session_id.clone(),
                state: session.state,
                operation: "hydrate",
            });
        }

        session.players = room
            .members
            .iter()
            .map(|m| (m.player_id.clone(), PlayerState::starting(m.player_id.clone())))
            .collect();
        session.state = SessionLifecycleState::Playing;
        session.started_at = Some(now);
        session.last_access = now;

        tracing::info!(
            %session_id,
            room_id = %room.room_id,
            players = session.players.len(),
            "session hydrated"
        );
        Ok(())
    }

    /// Drops a placeholder whose bootstrap failed, so creation can be
    /// retried. Sessions that already reached `Playing` are kept.
    ///
    /// Returns `true` if a placeholder was removed.
    pub fn abandon(&mut self, session_id: &SessionId) -> bool {
        let is_placeholder = self
            .sessions
            .get(session_id)
            .is_some_and(|s| s.state == SessionLifecycleState::Loading);
        if is_placeholder {
            self.sessions.remove(session_id);
        }
        is_placeholder
    }

    /// Reads the session's lifecycle state and roster.
    ///
    /// A session still `Loading` has no windows yet and reads back empty.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — unknown session
    /// - [`SessionError::WindowForbidden`] — `now` is in a write window
    pub fn game_state(
        &mut self,
        session_id: &SessionId,
        now: Instant,
    ) -> Result<GameSnapshot, SessionError> {
        let gate = self.config.window;
        let session = self.session_mut(session_id)?;
        session.last_access = now;

        if let Some(started_at) = session.started_at {
            if !gate.can_read(started_at, now) {
                return Err(SessionError::WindowForbidden {
                    session_id: session_id.clone(),
                    access: Access::Read,
                });
            }
        }
        Ok(session.snapshot())
    }

    /// Replaces one player's state wholesale. Nothing from the previous
    /// state survives, items included.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — unknown session
    /// - [`SessionError::InvalidState`] — the session is still `Loading`
    /// - [`SessionError::WindowForbidden`] — `now` is in a read window
    /// - [`SessionError::PlayerNotFound`] — the player isn't on the roster
    pub fn post_game_state(
        &mut self,
        session_id: &SessionId,
        info: PlayerInfo,
        now: Instant,
    ) -> Result<(), SessionError> {
        let gate = self.config.window;
        let session = self.session_mut(session_id)?;
        session.last_access = now;

        let Some(started_at) = session.started_at else {
            return Err(SessionError::InvalidState {
                session_id: session_id.clone(),
                state: session.state,
                operation: "post game state",
            });
        };
        if !gate.can_write(started_at, now) {
            return Err(SessionError::WindowForbidden {
                session_id: session_id.clone(),
                access: Access::Write,
            });
        }

        let slot = session.players.get_mut(&info.player_id).ok_or_else(|| {
            SessionError::PlayerNotFound(info.player_id.clone(), session_id.clone())
        })?;
        *slot = PlayerState::from(info);
        tracing::debug!(%session_id, player_id = %slot.player_id, "player state replaced");
        Ok(())
    }

    /// Removes sessions idle for longer than the configured TTL and
    /// returns their IDs.
    ///
    /// `Loading` placeholders are never reaped: they belong to a bootstrap
    /// still in flight, which either hydrates or abandons them itself.
    pub fn reap_idle(&mut self, now: Instant) -> Vec<SessionId> {
        let ttl = self.config.idle_ttl;
        let mut reaped = Vec::new();
        self.sessions.retain(|session_id, session| {
            let idle = session.state != SessionLifecycleState::Loading
                && now.saturating_duration_since(session.last_access) > ttl;
            if idle {
                reaped.push(session_id.clone());
            }
            !idle
        });
        for session_id in &reaped {
            tracing::info!(%session_id, "idle session reaped");
        }
        reaped
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn session_mut(&mut self, session_id: &SessionId) -> Result<&mut Session, SessionError> {
        self.sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
