//! The session host's RPC façade.

use std::sync::Weak;
use std::time::{Duration, Instant};

use roomgate_protocol::{
    Ack, Fault, GameStateReply, SessionId, SessionRequest, SessionResponse,
};
use roomgate_session::{
    BootstrapConfig, BootstrapCoordinator, RoomStateSource, SessionConfig,
    SessionRegistry,
};
use tokio::sync::Mutex;

use crate::rpc::Service;

/// Serves [`SessionRequest`]s for the sessions hosted by this process.
///
/// Reads and writes lock the registry for a single operation. Creation
/// goes through the [`BootstrapCoordinator`], which releases the lock
/// while it waits on the room broker.
pub struct SessionService<S: RoomStateSource> {
    sessions: Mutex<SessionRegistry>,
    bootstrap: BootstrapCoordinator<S>,
}

impl<S: RoomStateSource> SessionService<S> {
    pub fn new(
        source: S,
        session_config: SessionConfig,
        bootstrap_config: BootstrapConfig,
    ) -> Self {
        Self {
            sessions: Mutex::new(SessionRegistry::new(session_config)),
            bootstrap: BootstrapCoordinator::new(source, bootstrap_config),
        }
    }

    pub fn sessions(&self) -> &Mutex<SessionRegistry> {
        &self.sessions
    }

    /// Drops sessions idle past the configured TTL.
    pub async fn reap_idle(&self) -> Vec<SessionId> {
        let reaped = self.sessions.lock().await.reap_idle(Instant::now());
        if !reaped.is_empty() {
            tracing::info!(count = reaped.len(), "reaped idle sessions");
        }
        reaped
    }
}

impl<S: RoomStateSource> Service for SessionService<S> {
    type Request = SessionRequest;
    type Response = SessionResponse;

    async fn handle(&self, request: SessionRequest) -> SessionResponse {
        match request {
            SessionRequest::CreateGameWithInstance {
                session_id,
                room_id,
            } => {
                let result = self
                    .bootstrap
                    .create_session(&self.sessions, session_id.clone(), room_id.clone())
                    .await;
                if result.is_ok() {
                    tracing::info!(%session_id, %room_id, "session created");
                }
                SessionResponse::CreateGameWithInstance(Ack::from(result))
            }
            SessionRequest::GetGameState { session_id } => {
                let result = self
                    .sessions
                    .lock()
                    .await
                    .game_state(&session_id, Instant::now());
                let reply = match result {
                    Ok(snapshot) => GameStateReply {
                        ok: true,
                        message: String::new(),
                        state: Some(snapshot.state),
                        players: snapshot.players,
                    },
                    Err(e) => GameStateReply {
                        ok: false,
                        message: e.to_string(),
                        state: None,
                        players: Vec::new(),
                    },
                };
                SessionResponse::GetGameState(reply)
            }
            SessionRequest::PostGameState { session_id, player } => {
                let result = self.sessions.lock().await.post_game_state(
                    &session_id,
                    player,
                    Instant::now(),
                );
                SessionResponse::PostGameState(Ack::from(result))
            }
        }
    }

    fn fault(code: u16, message: String) -> SessionResponse {
        SessionResponse::Fault(Fault { code, message })
    }
}

/// Periodically reaps idle sessions until the service is dropped.
pub(crate) fn spawn_reaper<S: RoomStateSource>(
    service: Weak<SessionService<S>>,
    every: Duration,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(service) = service.upgrade() else {
                break;
            };
            service.reap_idle().await;
        }
        tracing::debug!("session reaper stopped");
    });
}
