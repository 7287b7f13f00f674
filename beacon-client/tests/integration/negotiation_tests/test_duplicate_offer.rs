use crate::integration::init_tracing;
use crate::utils::MockTransport;
use beacon_client::negotiation::{Negotiator, SessionState};
use beacon_client::relay::{InMemoryHub, SignalRelay};
use beacon_core::model::{Role, RoomId, SessionDescription, SignalKind, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_replayed_offer_produces_exactly_one_answer() {
    init_tracing();
    let hub = InMemoryHub::new();
    let room = RoomId::new();
    let host_id = UserId::new();
    let viewer_id = UserId::new();

    let host_relay = hub.relay_for(host_id.clone());
    host_relay
        .send(
            &room,
            None,
            SignalKind::Offer,
            SessionDescription::offer("v=0 host".to_string())
                .to_payload()
                .unwrap(),
        )
        .await
        .unwrap();

    let viewer_relay = Arc::new(hub.relay_for(viewer_id.clone()));
    let (events_tx, _events_rx) = mpsc::channel(8);
    let transport = Arc::new(MockTransport::new(events_tx, false));
    let mut negotiator = Negotiator::new(
        room.clone(),
        viewer_id,
        Role::Viewer,
        viewer_relay.clone(),
        transport,
        Duration::from_millis(10),
    );
    negotiator.begin().await.unwrap();
    assert_eq!(negotiator.state(), SessionState::AwaitingOffer);

    let offer = viewer_relay.poll(&room).await.unwrap().remove(0);

    negotiator.handle_signal(&offer).await.unwrap();
    assert_eq!(negotiator.state(), SessionState::Connecting);
    assert_eq!(negotiator.remote_peer(), Some(&host_id));

    // Duplicate delivery of the same record: ignored by state guard.
    negotiator.handle_signal(&offer).await.unwrap();
    assert_eq!(negotiator.state(), SessionState::Connecting);

    let answers: Vec<_> = hub
        .room_log(&room)
        .into_iter()
        .filter(|r| r.kind == SignalKind::Answer)
        .collect();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].to_user_id, Some(host_id));
}

#[tokio::test]
async fn test_self_authored_record_is_ignored() {
    init_tracing();
    let hub = InMemoryHub::new();
    let room = RoomId::new();
    let viewer_id = UserId::new();

    let relay = Arc::new(hub.relay_for(viewer_id.clone()));
    let (events_tx, _events_rx) = mpsc::channel(8);
    let transport = Arc::new(MockTransport::new(events_tx, false));
    let mut negotiator = Negotiator::new(
        room.clone(),
        viewer_id.clone(),
        Role::Viewer,
        relay,
        transport.clone(),
        Duration::from_millis(10),
    );
    negotiator.begin().await.unwrap();

    // A record that slipped past relay filtering must still be dropped.
    let record = beacon_core::model::SignalRecord {
        id: beacon_core::model::SignalId::new(),
        room_id: room,
        from_user_id: viewer_id,
        to_user_id: None,
        kind: SignalKind::Offer,
        payload: SessionDescription::offer("v=0 self".to_string())
            .to_payload()
            .unwrap(),
        processed: false,
        created_at: beacon_core::time::unix_millis(),
    };
    negotiator.handle_signal(&record).await.unwrap();

    assert_eq!(negotiator.state(), SessionState::AwaitingOffer);
    assert!(transport.remote_description().is_none());
}
