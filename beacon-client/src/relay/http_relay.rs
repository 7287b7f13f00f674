use crate::error::RelayError;
use crate::relay::SignalRelay;
use async_trait::async_trait;
use beacon_core::model::{
    FileId, IceServerConfig, RoomId, SignalId, SignalKind, SignalRecord, UserId,
};
use beacon_core::wire::{
    CreateRoomRequest, IceServersResponse, MessageView, PollResponse, RoomDetails, RoomSummary,
    SendMessageRequest, SendSignalRequest, SendSignalResponse, SessionRequest, SessionResponse,
    UploadResponse,
};
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Transport(err.to_string())
    }
}

/// HTTP client for the relay server, bound to one authenticated session.
#[derive(Clone)]
pub struct HttpRelay {
    http: reqwest::Client,
    base_url: String,
    token: String,
    user_id: UserId,
}

impl HttpRelay {
    /// Create a fresh session on the server and return a client bound
    /// to it.
    pub async fn create_session(base_url: &str, display_name: &str) -> Result<Self, RelayError> {
        let http = reqwest::Client::new();
        let res = http
            .post(format!("{base_url}/api/session"))
            .json(&SessionRequest {
                display_name: display_name.to_string(),
            })
            .send()
            .await?;
        let session: SessionResponse = Self::parse(res).await?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: session.token,
            user_id: session.user_id,
        })
    }

    /// Rebuild a client from a previously issued token.
    pub fn with_token(base_url: &str, token: String, user_id: UserId) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            user_id,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn ice_servers(&self) -> Result<Vec<IceServerConfig>, RelayError> {
        let res: IceServersResponse = self.get_json("/api/ice-servers").await?;
        Ok(res.ice_servers)
    }

    pub async fn create_room(
        &self,
        name: &str,
        max_participants: Option<u32>,
    ) -> Result<RoomDetails, RelayError> {
        self.post_json(
            "/api/rooms",
            &CreateRoomRequest {
                name: name.to_string(),
                max_participants,
            },
        )
        .await
    }

    pub async fn rooms(&self) -> Result<Vec<RoomSummary>, RelayError> {
        self.get_json("/api/rooms").await
    }

    pub async fn room_details(&self, room: &RoomId) -> Result<RoomDetails, RelayError> {
        self.get_json(&format!("/api/rooms/{room}")).await
    }

    pub async fn join_room(&self, room: &RoomId) -> Result<RoomDetails, RelayError> {
        self.post_empty(&format!("/api/rooms/{room}/join")).await
    }

    pub async fn leave_room(&self, room: &RoomId) -> Result<(), RelayError> {
        let res = self
            .http
            .post(format!("{}/api/rooms/{room}/leave", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::expect_ok(res).await
    }

    pub async fn messages(&self, room: &RoomId) -> Result<Vec<MessageView>, RelayError> {
        self.get_json(&format!("/api/rooms/{room}/messages")).await
    }

    pub async fn send_text(&self, room: &RoomId, content: &str) -> Result<MessageView, RelayError> {
        self.post_json(
            &format!("/api/rooms/{room}/messages"),
            &SendMessageRequest {
                content: Some(content.to_string()),
                kind: None,
                file_id: None,
                file_name: None,
            },
        )
        .await
    }

    pub async fn upload_file(&self, name: &str, data: Bytes) -> Result<FileId, RelayError> {
        let res = self
            .http
            .post(format!("{}/api/files", self.base_url))
            .bearer_auth(&self.token)
            .header("x-file-name", name)
            .header("content-type", "application/octet-stream")
            .body(data)
            .send()
            .await?;
        let body: UploadResponse = Self::parse(res).await?;
        Ok(body.file_id)
    }

    pub async fn send_file_message(
        &self,
        room: &RoomId,
        file_id: FileId,
    ) -> Result<MessageView, RelayError> {
        self.post_json(
            &format!("/api/rooms/{room}/messages"),
            &SendMessageRequest {
                content: None,
                kind: None,
                file_id: Some(file_id),
                file_name: None,
            },
        )
        .await
    }

    pub async fn download_file(&self, file: &FileId) -> Result<Bytes, RelayError> {
        let res = self
            .http
            .get(format!("{}/api/files/{file}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Self::error_for(res).await);
        }
        Ok(res.bytes().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RelayError> {
        let res = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse(res).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RelayError> {
        let res = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::parse(res).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, RelayError> {
        let res = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse(res).await
    }

    async fn parse<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, RelayError> {
        if !res.status().is_success() {
            return Err(Self::error_for(res).await);
        }
        Ok(res.json().await?)
    }

    async fn expect_ok(res: reqwest::Response) -> Result<(), RelayError> {
        if !res.status().is_success() {
            return Err(Self::error_for(res).await);
        }
        Ok(())
    }

    async fn error_for(res: reqwest::Response) -> RelayError {
        let status = res.status();
        let message = match res.json::<beacon_core::wire::ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => RelayError::Unauthorized,
            StatusCode::NOT_FOUND => RelayError::NotFound(message),
            StatusCode::BAD_REQUEST => RelayError::Validation(message),
            _ => RelayError::Transport(message),
        }
    }
}

#[async_trait]
impl SignalRelay for HttpRelay {
    async fn send(
        &self,
        room: &RoomId,
        to: Option<UserId>,
        kind: SignalKind,
        payload: String,
    ) -> Result<SignalId, RelayError> {
        let res: SendSignalResponse = self
            .post_json(
                &format!("/api/rooms/{room}/signals"),
                &SendSignalRequest {
                    to_user_id: to,
                    kind,
                    payload,
                },
            )
            .await?;
        Ok(res.signal_id)
    }

    async fn poll(&self, room: &RoomId) -> Result<Vec<SignalRecord>, RelayError> {
        let res: PollResponse = self
            .get_json(&format!("/api/rooms/{room}/signals"))
            .await?;
        Ok(res.signals)
    }

    async fn ack(&self, signal: &SignalId) -> Result<(), RelayError> {
        let res = self
            .http
            .post(format!("{}/api/signals/{signal}/ack", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::expect_ok(res).await
    }
}
