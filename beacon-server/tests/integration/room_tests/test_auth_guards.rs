use reqwest::StatusCode;

use crate::integration::init_tracing;
use crate::utils::{TestApi, spawn_server};

#[tokio::test]
async fn test_writes_require_a_token() {
    init_tracing();
    let base = spawn_server().await;

    let anon = TestApi::anonymous(&base);
    let res = anon
        .post_json(
            "/api/rooms",
            &beacon_core::wire::CreateRoomRequest {
                name: "nope".to_string(),
                max_participants: None,
            },
        )
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    init_tracing();
    let base = spawn_server().await;

    let user = TestApi::session(&base, "ann").await;
    let room_id = user.create_room("demo").await.room.id;

    let res = reqwest::Client::new()
        .get(format!("{base}/api/rooms/{room_id}/signals"))
        .bearer_auth("feedfacecafebeef")
        .send()
        .await
        .expect("request failed");
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    init_tracing();
    let base = spawn_server().await;

    let user = TestApi::session(&base, "ann").await;
    let res = user.post_empty("/api/rooms/not-a-uuid/join").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = user.post_empty("/api/signals/not-a-uuid/ack").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
