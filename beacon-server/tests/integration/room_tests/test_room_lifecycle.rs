use beacon_core::model::Role;

use crate::integration::init_tracing;
use crate::utils::{TestApi, spawn_server};

#[tokio::test]
async fn test_create_join_and_leave() {
    init_tracing();
    let base = spawn_server().await;

    let host = TestApi::session(&base, "ann").await;
    let viewer = TestApi::session(&base, "bob").await;

    let details = host.create_room("friday demo").await;
    let room_id = details.room.id.clone();
    assert_eq!(details.participants.len(), 1);
    assert_eq!(details.participants[0].role, Role::Host);

    let details = viewer.join(&room_id).await;
    assert_eq!(details.participants.len(), 2);
    assert!(details.participants.iter().all(|p| p.is_connected));

    viewer.leave(&room_id).await;
    let details = host.details(&room_id).await;
    let bob = details
        .participants
        .iter()
        .find(|p| p.user_id == viewer.user_id())
        .expect("bob should stay listed");
    assert!(!bob.is_connected, "leaving only flips the connected flag");

    // Re-join restores the seat without duplicating it.
    viewer.join(&room_id).await;
    let details = host.details(&room_id).await;
    assert_eq!(details.participants.len(), 2);
}

#[tokio::test]
async fn test_room_list_reflects_membership() {
    init_tracing();
    let base = spawn_server().await;

    let host = TestApi::session(&base, "ann").await;
    let viewer = TestApi::session(&base, "bob").await;

    let room_id = host.create_room("demo").await.room.id;
    viewer.join(&room_id).await;

    let res = viewer.get("/api/rooms").await;
    let rooms: Vec<beacon_core::wire::RoomSummary> = res.json().await.expect("rooms json");
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, room_id);
    assert_eq!(rooms[0].role, Role::Viewer);
    assert_eq!(rooms[0].connected_count, 2);
}

#[tokio::test]
async fn test_join_of_unknown_room_is_404() {
    init_tracing();
    let base = spawn_server().await;

    let user = TestApi::session(&base, "ann").await;
    let res = user
        .post_empty(&format!(
            "/api/rooms/{}/join",
            beacon_core::model::RoomId::new()
        ))
        .await;
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
}
