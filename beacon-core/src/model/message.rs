use crate::model::ids::{FileId, MessageId, RoomId, UserId};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    File,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub from_user_id: UserId,
    pub author_name: String,
    pub kind: MessageKind,
    pub content: String,
    pub file_id: Option<FileId>,
    pub file_name: Option<String>,
    pub created_at: u64,
}

/// Uploaded file blob plus the metadata needed to serve it back.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: FileId,
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
    pub uploaded_by: UserId,
    pub created_at: u64,
}
