//! Integration tests for session bootstrap against stand-in brokers.
//!
//! Timeouts use `start_paused = true`: the runtime jumps the clock
//! forward whenever every task is idle, so a stalled broker hits the
//! deadline instantly instead of after 10 real seconds.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use roomgate_protocol::{
    PlayerId, ReadinessState, RoomId, RoomLifecycleState, RoomMember,
    RoomSnapshot, SessionId, SessionLifecycleState,
};
use roomgate_session::{
    BootstrapConfig, BootstrapCoordinator, RoomStateSource, SessionError,
    SessionRegistry,
};
use tokio::sync::{Mutex, Notify};

// =========================================================================
// Stand-in brokers
// =========================================================================

fn snapshot(room_id: u64, members: &[&str]) -> RoomSnapshot {
    RoomSnapshot {
        room_id: RoomId::from(room_id),
        map_id: "000".into(),
        capacity: 8,
        owner: PlayerId::from(members[0]),
        state: RoomLifecycleState::Loading,
        members: members
            .iter()
            .map(|m| RoomMember {
                player_id: PlayerId::from(*m),
                state: ReadinessState::Ready,
            })
            .collect(),
        assignment: None,
    }
}

/// Answers from a fixed table and counts calls.
#[derive(Default)]
struct TableBroker {
    rooms: HashMap<RoomId, RoomSnapshot>,
    calls: AtomicUsize,
}

impl TableBroker {
    fn with(room: RoomSnapshot) -> Self {
        let mut rooms = HashMap::new();
        rooms.insert(room.room_id.clone(), room);
        Self {
            rooms,
            calls: AtomicUsize::new(0),
        }
    }
}

impl RoomStateSource for TableBroker {
    async fn fetch_room(&self, room_id: &RoomId) -> Result<RoomSnapshot, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| SessionError::RoomNotFound(room_id.clone()))
    }
}

/// Never answers.
struct StalledBroker;

impl RoomStateSource for StalledBroker {
    async fn fetch_room(&self, room_id: &RoomId) -> Result<RoomSnapshot, SessionError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(SessionError::RoomNotFound(room_id.clone()))
    }
}

/// Answers only once released, so tests can inspect the registry while
/// a bootstrap is in flight.
struct GatedBroker {
    release: Arc<Notify>,
    room: RoomSnapshot,
}

impl RoomStateSource for GatedBroker {
    async fn fetch_room(&self, _room_id: &RoomId) -> Result<RoomSnapshot, SessionError> {
        self.release.notified().await;
        Ok(self.room.clone())
    }
}

fn sid(s: &str) -> SessionId {
    SessionId::from(s)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_create_session_hydrates_every_member() {
    let coordinator = BootstrapCoordinator::new(
        TableBroker::with(snapshot(1, &["alice", "bob"])),
        BootstrapConfig::default(),
    );
    let sessions = Mutex::new(SessionRegistry::default());

    coordinator
        .create_session(&sessions, sid("1_GID"), RoomId::from(1))
        .await
        .expect("bootstrap should succeed");

    let registry = sessions.lock().await;
    let session = registry.get(&sid("1_GID")).expect("registered");
    assert_eq!(session.state, SessionLifecycleState::Playing);
    assert!(session.started_at.is_some());
    assert_eq!(session.players.len(), 2);
    for p in session.players.values() {
        assert_eq!(p.health, 100);
        assert_eq!(p.profession_id, "warrior");
        assert!(p.items.is_empty());
    }
}

#[tokio::test]
async fn test_create_session_duplicate_rejected_before_broker_call() {
    let coordinator = BootstrapCoordinator::new(
        TableBroker::with(snapshot(1, &["alice"])),
        BootstrapConfig::default(),
    );
    let sessions = Mutex::new(SessionRegistry::default());

    coordinator
        .create_session(&sessions, sid("1_GID"), RoomId::from(1))
        .await
        .unwrap();
    let err = coordinator
        .create_session(&sessions, sid("1_GID"), RoomId::from(1))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::AlreadyExists(_)));
    assert_eq!(coordinator.source().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_create_session_unknown_room_removes_placeholder() {
    let coordinator =
        BootstrapCoordinator::new(TableBroker::default(), BootstrapConfig::default());
    let sessions = Mutex::new(SessionRegistry::default());

    let err = coordinator
        .create_session(&sessions, sid("7_GID"), RoomId::from(7))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::RoomNotFound(_)));
    assert!(sessions.lock().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_create_session_stalled_broker_times_out_as_upstream_unavailable() {
    let coordinator = BootstrapCoordinator::new(StalledBroker, BootstrapConfig::default());
    let sessions = Mutex::new(SessionRegistry::default());

    let started = tokio::time::Instant::now();
    let err = coordinator
        .create_session(&sessions, sid("1_GID"), RoomId::from(1))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::UpstreamUnavailable(_)));
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(10) && waited < Duration::from_secs(11));
    assert!(sessions.lock().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_create_session_retry_after_failure_succeeds() {
    let sessions = Mutex::new(SessionRegistry::default());

    let failing = BootstrapCoordinator::new(StalledBroker, BootstrapConfig::default());
    assert!(
        failing
            .create_session(&sessions, sid("1_GID"), RoomId::from(1))
            .await
            .is_err()
    );

    let working = BootstrapCoordinator::new(
        TableBroker::with(snapshot(1, &["alice"])),
        BootstrapConfig::default(),
    );
    working
        .create_session(&sessions, sid("1_GID"), RoomId::from(1))
        .await
        .expect("retry after rollback should succeed");
}

#[tokio::test]
async fn test_create_session_registry_usable_while_broker_call_in_flight() {
    let release = Arc::new(Notify::new());
    let coordinator = Arc::new(BootstrapCoordinator::new(
        GatedBroker {
            release: Arc::clone(&release),
            room: snapshot(1, &["alice"]),
        },
        BootstrapConfig::default(),
    ));
    let sessions = Arc::new(Mutex::new(SessionRegistry::default()));

    let task = {
        let coordinator = Arc::clone(&coordinator);
        let sessions = Arc::clone(&sessions);
        tokio::spawn(async move {
            coordinator
                .create_session(&sessions, sid("1_GID"), RoomId::from(1))
                .await
        })
    };

    // Wait for the placeholder to show up, taking the lock each time.
    loop {
        let registry = sessions.lock().await;
        if let Some(session) = registry.get(&sid("1_GID")) {
            assert_eq!(session.state, SessionLifecycleState::Loading);
            break;
        }
        drop(registry);
        tokio::task::yield_now().await;
    }

    release.notify_one();
    task.await.expect("join").expect("bootstrap");

    let registry = sessions.lock().await;
    assert_eq!(
        registry.get(&sid("1_GID")).unwrap().state,
        SessionLifecycleState::Playing
    );
}
