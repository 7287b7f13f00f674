//! Request and response bodies for the relay HTTP API.

use crate::model::{
    ChatMessage, FileId, IceServerConfig, MessageId, MessageKind, Participant, Role, Room, RoomId,
    SignalId, SignalKind, SignalRecord, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: UserId,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceServersResponse {
    pub ice_servers: Vec<IceServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub max_participants: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub is_active: bool,
    pub role: Role,
    pub connected_count: usize,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    pub room: Room,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: Option<String>,
    pub kind: Option<MessageKind>,
    pub file_id: Option<FileId>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: MessageId,
    pub from_user_id: UserId,
    pub author_name: String,
    pub kind: MessageKind,
    pub content: String,
    pub file_id: Option<FileId>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub created_at: u64,
}

impl From<ChatMessage> for MessageView {
    fn from(msg: ChatMessage) -> Self {
        let file_url = msg.file_id.as_ref().map(|id| format!("/api/files/{id}"));
        Self {
            id: msg.id,
            from_user_id: msg.from_user_id,
            author_name: msg.author_name,
            kind: msg.kind,
            content: msg.content,
            file_id: msg.file_id,
            file_name: msg.file_name,
            file_url,
            created_at: msg.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: FileId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSignalRequest {
    pub to_user_id: Option<UserId>,
    pub kind: SignalKind,
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSignalResponse {
    pub signal_id: SignalId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub signals: Vec<SignalRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
