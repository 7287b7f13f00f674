use crate::integration::init_tracing;
use crate::utils::{MockCapture, MockTransportFactory, wait_for};
use beacon_client::media::CaptureSource;
use beacon_client::relay::InMemoryHub;
use beacon_client::session::{MediaSession, SessionConfig};
use beacon_client::negotiation::SessionState;
use beacon_client::transport::TransportFactory;
use beacon_core::model::{Role, RoomId, SignalKind, UserId};
use std::sync::Arc;
use std::time::Duration;

fn fast_config() -> SessionConfig {
    SessionConfig {
        poll_interval: Duration::from_millis(20),
        send_retry_backoff: Duration::from_millis(10),
        ..Default::default()
    }
}

fn session(
    hub: &Arc<InMemoryHub>,
    room: &RoomId,
    user: &UserId,
    role: Role,
    capture: Arc<dyn CaptureSource>,
    transports: Arc<dyn TransportFactory>,
) -> MediaSession {
    MediaSession::new(
        Arc::new(hub.relay_for(user.clone())),
        capture,
        transports,
        fast_config(),
        room.clone(),
        user.clone(),
        role,
    )
}

#[tokio::test]
async fn test_host_offer_viewer_answer_reaches_connected() {
    init_tracing();
    let hub = InMemoryHub::new();
    let room = RoomId::new();
    let host_id = UserId::new();
    let viewer_id = UserId::new();

    let host_transports = MockTransportFactory::new(true);
    let viewer_transports = MockTransportFactory::new(true);

    let viewer = session(
        &hub,
        &room,
        &viewer_id,
        Role::Viewer,
        Arc::new(MockCapture::granting()),
        viewer_transports.clone(),
    );
    let host = session(
        &hub,
        &room,
        &host_id,
        Role::Host,
        Arc::new(MockCapture::granting()),
        host_transports.clone(),
    );

    let _viewer_events = viewer.start().await.unwrap();
    assert_eq!(viewer.state(), SessionState::AwaitingOffer);

    let _host_events = host.start().await.unwrap();

    wait_for("both sessions to connect", || {
        host.state() == SessionState::Connected && viewer.state() == SessionState::Connected
    })
    .await;

    // Exactly one answer, addressed to the offer's author.
    let log = hub.room_log(&room);
    let answers: Vec<_> = log
        .iter()
        .filter(|r| r.kind == SignalKind::Answer)
        .collect();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].from_user_id, viewer_id);
    assert_eq!(answers[0].to_user_id, Some(host_id.clone()));

    // The offer went out as a broadcast and was consumed.
    let offer = log
        .iter()
        .find(|r| r.kind == SignalKind::Offer)
        .expect("no offer stored");
    assert_eq!(offer.from_user_id, host_id);
    assert_eq!(offer.to_user_id, None);

    wait_for("offer and answer to be acked", || {
        hub.room_log(&room)
            .iter()
            .filter(|r| matches!(r.kind, SignalKind::Offer | SignalKind::Answer))
            .all(|r| r.processed)
    })
    .await;

    host.stop().await;
    viewer.stop().await;
    assert_eq!(host.state(), SessionState::Closed);
    assert!(host_transports.last().is_closed());
}

#[tokio::test]
async fn test_both_sides_exchange_descriptions() {
    init_tracing();
    let hub = InMemoryHub::new();
    let room = RoomId::new();
    let host_id = UserId::new();
    let viewer_id = UserId::new();

    let host_transports = MockTransportFactory::new(true);
    let viewer_transports = MockTransportFactory::new(true);

    let viewer = session(
        &hub,
        &room,
        &viewer_id,
        Role::Viewer,
        Arc::new(MockCapture::granting()),
        viewer_transports.clone(),
    );
    let host = session(
        &hub,
        &room,
        &host_id,
        Role::Host,
        Arc::new(MockCapture::granting()),
        host_transports.clone(),
    );

    let _v = viewer.start().await.unwrap();
    let _h = host.start().await.unwrap();

    wait_for("descriptions to be applied on both sides", || {
        host_transports.last().remote_description().is_some()
            && viewer_transports.last().remote_description().is_some()
    })
    .await;

    host.stop().await;
    viewer.stop().await;
}
