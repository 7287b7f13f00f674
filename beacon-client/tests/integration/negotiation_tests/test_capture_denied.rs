use crate::integration::init_tracing;
use crate::utils::{MockCapture, MockTransportFactory};
use beacon_client::error::{CaptureError, SessionError};
use beacon_client::negotiation::SessionState;
use beacon_client::relay::InMemoryHub;
use beacon_client::session::{MediaSession, SessionConfig};
use beacon_core::model::{Role, RoomId, UserId};
use std::sync::Arc;

#[tokio::test]
async fn test_denied_capture_leaves_idle_and_sends_nothing() {
    init_tracing();
    let hub = InMemoryHub::new();
    let room = RoomId::new();
    let host_id = UserId::new();

    let host = MediaSession::new(
        Arc::new(hub.relay_for(host_id.clone())),
        Arc::new(MockCapture::denying()),
        MockTransportFactory::new(false),
        SessionConfig::default(),
        room.clone(),
        host_id,
        Role::Host,
    );

    let err = host.start().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Capture(CaptureError::PermissionDenied)
    ));

    // Restartable: back to Idle, and not a single record went out.
    assert_eq!(host.state(), SessionState::Idle);
    assert!(hub.room_log(&room).is_empty());
}
