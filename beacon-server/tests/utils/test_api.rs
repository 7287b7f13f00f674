use beacon_core::model::{FileId, RoomId, SignalId, SignalKind, SignalRecord, UserId};
use beacon_core::wire::{
    CreateRoomRequest, MessageView, PollResponse, RoomDetails, SendMessageRequest,
    SendSignalRequest, SendSignalResponse, SessionRequest, SessionResponse, UploadResponse,
};
use beacon_server::{AppState, default_ice_servers, router};
use reqwest::StatusCode;
use tokio::net::TcpListener;

/// Boot a relay server on an ephemeral port and return its base url.
pub async fn spawn_server() -> String {
    let state = AppState::new(default_ice_servers());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });

    format!("http://{addr}")
}

/// Thin typed client over the relay HTTP API for tests.
pub struct TestApi {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
    user_id: Option<UserId>,
}

impl TestApi {
    pub fn anonymous(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.to_string(),
            token: None,
            user_id: None,
        }
    }

    /// Create a session and keep its bearer token for later calls.
    pub async fn session(base: &str, display_name: &str) -> Self {
        let mut api = Self::anonymous(base);
        let res: SessionResponse = api
            .http
            .post(format!("{base}/api/session"))
            .json(&SessionRequest {
                display_name: display_name.to_string(),
            })
            .send()
            .await
            .expect("session request failed")
            .json()
            .await
            .expect("session response not json");

        api.token = Some(res.token);
        api.user_id = Some(res.user_id);
        api
    }

    pub fn user_id(&self) -> UserId {
        self.user_id.clone().expect("client has no session")
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.authed(self.http.get(format!("{}{path}", self.base)))
            .send()
            .await
            .expect("get failed")
    }

    pub async fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> reqwest::Response {
        self.authed(self.http.post(format!("{}{path}", self.base)))
            .json(body)
            .send()
            .await
            .expect("post failed")
    }

    pub async fn post_empty(&self, path: &str) -> reqwest::Response {
        self.authed(self.http.post(format!("{}{path}", self.base)))
            .send()
            .await
            .expect("post failed")
    }

    pub async fn create_room(&self, name: &str) -> RoomDetails {
        let res = self
            .post_json(
                "/api/rooms",
                &CreateRoomRequest {
                    name: name.to_string(),
                    max_participants: None,
                },
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK, "create room failed");
        res.json().await.expect("room details not json")
    }

    pub async fn join(&self, room: &RoomId) -> RoomDetails {
        let res = self.post_empty(&format!("/api/rooms/{room}/join")).await;
        assert_eq!(res.status(), StatusCode::OK, "join failed");
        res.json().await.expect("room details not json")
    }

    pub async fn leave(&self, room: &RoomId) {
        let res = self.post_empty(&format!("/api/rooms/{room}/leave")).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT, "leave failed");
    }

    pub async fn details(&self, room: &RoomId) -> RoomDetails {
        let res = self.get(&format!("/api/rooms/{room}")).await;
        assert_eq!(res.status(), StatusCode::OK, "details failed");
        res.json().await.expect("room details not json")
    }

    pub async fn send_signal(
        &self,
        room: &RoomId,
        to: Option<UserId>,
        kind: SignalKind,
        payload: &str,
    ) -> SignalId {
        let res = self
            .post_json(
                &format!("/api/rooms/{room}/signals"),
                &SendSignalRequest {
                    to_user_id: to,
                    kind,
                    payload: payload.to_string(),
                },
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK, "send signal failed");
        let body: SendSignalResponse = res.json().await.expect("signal response not json");
        body.signal_id
    }

    pub async fn poll(&self, room: &RoomId) -> Vec<SignalRecord> {
        let res = self.get(&format!("/api/rooms/{room}/signals")).await;
        assert_eq!(res.status(), StatusCode::OK, "poll failed");
        let body: PollResponse = res.json().await.expect("poll response not json");
        body.signals
    }

    pub async fn ack(&self, signal: &SignalId) {
        let res = self.post_empty(&format!("/api/signals/{signal}/ack")).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT, "ack failed");
    }

    pub async fn send_text(&self, room: &RoomId, content: &str) -> MessageView {
        let res = self
            .post_json(
                &format!("/api/rooms/{room}/messages"),
                &SendMessageRequest {
                    content: Some(content.to_string()),
                    kind: None,
                    file_id: None,
                    file_name: None,
                },
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK, "send message failed");
        res.json().await.expect("message view not json")
    }

    pub async fn send_file_message(&self, room: &RoomId, file_id: FileId) -> MessageView {
        let res = self
            .post_json(
                &format!("/api/rooms/{room}/messages"),
                &SendMessageRequest {
                    content: None,
                    kind: None,
                    file_id: Some(file_id),
                    file_name: None,
                },
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK, "send file message failed");
        res.json().await.expect("message view not json")
    }

    pub async fn messages(&self, room: &RoomId) -> Vec<MessageView> {
        let res = self.get(&format!("/api/rooms/{room}/messages")).await;
        assert_eq!(res.status(), StatusCode::OK, "list messages failed");
        res.json().await.expect("messages not json")
    }

    pub async fn upload(&self, name: &str, bytes: &'static [u8]) -> FileId {
        let res = self
            .authed(self.http.post(format!("{}/api/files", self.base)))
            .header("x-file-name", name)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .expect("upload failed");
        assert_eq!(res.status(), StatusCode::OK, "upload rejected");
        let body: UploadResponse = res.json().await.expect("upload response not json");
        body.file_id
    }
}
