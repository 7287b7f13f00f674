use beacon_core::model::{SignalId, SignalKind};
use reqwest::StatusCode;

use crate::integration::init_tracing;
use crate::utils::{TestApi, spawn_server};

#[tokio::test]
async fn test_poll_does_not_consume_but_ack_does() {
    init_tracing();
    let base = spawn_server().await;

    let host = TestApi::session(&base, "ann").await;
    let viewer = TestApi::session(&base, "bob").await;

    let room_id = host.create_room("share").await.room.id;
    viewer.join(&room_id).await;

    let signal_id = host
        .send_signal(&room_id, None, SignalKind::Offer, "{\"sdp\":\"x\"}")
        .await;

    // Repeated polls keep returning the record.
    assert_eq!(viewer.poll(&room_id).await.len(), 1);
    assert_eq!(viewer.poll(&room_id).await.len(), 1);

    viewer.ack(&signal_id).await;
    assert!(viewer.poll(&room_id).await.is_empty());
}

#[tokio::test]
async fn test_double_ack_is_harmless() {
    init_tracing();
    let base = spawn_server().await;

    let host = TestApi::session(&base, "ann").await;
    let viewer = TestApi::session(&base, "bob").await;

    let room_id = host.create_room("share").await.room.id;
    viewer.join(&room_id).await;

    let signal_id = host
        .send_signal(&room_id, None, SignalKind::Offer, "{\"sdp\":\"x\"}")
        .await;

    viewer.ack(&signal_id).await;
    viewer.ack(&signal_id).await;
    // The author may ack too; the flag is already set so nothing changes.
    host.ack(&signal_id).await;
}

#[tokio::test]
async fn test_ack_of_unknown_signal_is_404() {
    init_tracing();
    let base = spawn_server().await;

    let user = TestApi::session(&base, "ann").await;
    let res = user
        .post_empty(&format!("/api/signals/{}/ack", SignalId::new()))
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_payload_is_rejected() {
    init_tracing();
    let base = spawn_server().await;

    let host = TestApi::session(&base, "ann").await;
    let room_id = host.create_room("share").await.room.id;

    let res = host
        .post_json(
            &format!("/api/rooms/{room_id}/signals"),
            &beacon_core::wire::SendSignalRequest {
                to_user_id: None,
                kind: SignalKind::Offer,
                payload: String::new(),
            },
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
