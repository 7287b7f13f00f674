use crate::integration::init_tracing;
use crate::utils::MockTransport;
use async_trait::async_trait;
use beacon_client::error::RelayError;
use beacon_client::negotiation::{Negotiator, SessionState};
use beacon_client::relay::{InMemoryHub, InMemoryRelay, SignalRelay};
use beacon_core::model::{Role, RoomId, SignalId, SignalKind, SignalRecord, UserId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Relay that fails the first `failures` sends, then behaves normally.
struct FlakyRelay {
    inner: InMemoryRelay,
    failures: AtomicUsize,
}

#[async_trait]
impl SignalRelay for FlakyRelay {
    async fn send(
        &self,
        room: &RoomId,
        to: Option<UserId>,
        kind: SignalKind,
        payload: String,
    ) -> Result<SignalId, RelayError> {
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(RelayError::Transport("injected failure".to_string()));
        }
        self.inner.send(room, to, kind, payload).await
    }

    async fn poll(&self, room: &RoomId) -> Result<Vec<SignalRecord>, RelayError> {
        self.inner.poll(room).await
    }

    async fn ack(&self, signal: &SignalId) -> Result<(), RelayError> {
        self.inner.ack(signal).await
    }
}

fn host_negotiator(relay: Arc<dyn SignalRelay>, room: RoomId) -> Negotiator {
    let (events_tx, _events_rx) = mpsc::channel(8);
    Negotiator::new(
        room,
        UserId::new(),
        Role::Host,
        relay,
        Arc::new(MockTransport::new(events_tx, false)),
        Duration::from_millis(5),
    )
}

#[tokio::test]
async fn test_single_send_failure_is_retried_and_succeeds() {
    init_tracing();
    let hub = InMemoryHub::new();
    let room = RoomId::new();
    let relay = Arc::new(FlakyRelay {
        inner: hub.relay_for(UserId::new()),
        failures: AtomicUsize::new(1),
    });

    let mut negotiator = host_negotiator(relay, room.clone());
    negotiator.begin().await.unwrap();

    assert_eq!(negotiator.state(), SessionState::Offering);
    assert_eq!(
        hub.room_log(&room)
            .iter()
            .filter(|r| r.kind == SignalKind::Offer)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_second_send_failure_surfaces_and_fails_the_machine() {
    init_tracing();
    let hub = InMemoryHub::new();
    let room = RoomId::new();
    let relay = Arc::new(FlakyRelay {
        inner: hub.relay_for(UserId::new()),
        failures: AtomicUsize::new(2),
    });

    let mut negotiator = host_negotiator(relay, room.clone());
    let err = negotiator.begin().await.unwrap_err();

    assert!(matches!(
        err,
        beacon_client::error::SessionError::Negotiation(_)
    ));
    assert_eq!(negotiator.state(), SessionState::Failed);
    assert!(hub.room_log(&room).is_empty());
}
