use crate::error::ServerError;
use crate::store::{FileStore, MessageStore, RoomStore};
use beacon_core::model::{ChatMessage, MessageId, MessageKind, RoomId, UserId};
use beacon_core::time::unix_millis;
use beacon_core::wire::{MessageView, SendMessageRequest};
use std::sync::Arc;

const HISTORY_LIMIT: usize = 50;

#[derive(Clone)]
pub struct MessageService {
    messages: Arc<MessageStore>,
    files: Arc<FileStore>,
    rooms: Arc<RoomStore>,
}

impl MessageService {
    pub fn new(messages: Arc<MessageStore>, files: Arc<FileStore>, rooms: Arc<RoomStore>) -> Self {
        Self {
            messages,
            files,
            rooms,
        }
    }

    /// Post a message. A request referencing an uploaded file becomes a
    /// file message with generated content; otherwise plain text or a
    /// system notice.
    pub fn send(
        &self,
        room_id: &RoomId,
        author: &UserId,
        author_name: &str,
        req: SendMessageRequest,
    ) -> Result<MessageView, ServerError> {
        if self.rooms.get(room_id).is_none() {
            return Err(ServerError::not_found("room", room_id));
        }

        let message = match req.file_id {
            Some(file_id) => {
                let Some(file) = self.files.get(&file_id) else {
                    return Err(ServerError::not_found("file", file_id));
                };
                let file_name = req.file_name.unwrap_or(file.name);

                ChatMessage {
                    id: MessageId::new(),
                    room_id: room_id.clone(),
                    from_user_id: author.clone(),
                    author_name: author_name.to_string(),
                    kind: MessageKind::File,
                    content: format!("Shared file: {file_name}"),
                    file_id: Some(file_id),
                    file_name: Some(file_name),
                    created_at: unix_millis(),
                }
            }
            None => {
                let kind = req.kind.unwrap_or(MessageKind::Text);
                if kind == MessageKind::File {
                    return Err(ServerError::validation(
                        "file messages must reference an uploaded file",
                    ));
                }
                let content = req.content.unwrap_or_default();
                if content.is_empty() {
                    return Err(ServerError::validation("message content must not be empty"));
                }

                ChatMessage {
                    id: MessageId::new(),
                    room_id: room_id.clone(),
                    from_user_id: author.clone(),
                    author_name: author_name.to_string(),
                    kind,
                    content,
                    file_id: None,
                    file_name: None,
                    created_at: unix_millis(),
                }
            }
        };

        self.messages.append(message.clone());
        Ok(message.into())
    }

    /// Latest messages, oldest first, capped at the history limit.
    pub fn list(&self, room_id: &RoomId) -> Vec<MessageView> {
        self.messages
            .list_recent(room_id, HISTORY_LIMIT)
            .into_iter()
            .map(MessageView::from)
            .collect()
    }
}
