use beacon_core::model::{ChatMessage, RoomId};
use dashmap::DashMap;

/// Per-room chat history, append only.
pub struct MessageStore {
    messages: DashMap<RoomId, Vec<ChatMessage>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: DashMap::new(),
        }
    }

    pub fn append(&self, message: ChatMessage) {
        self.messages
            .entry(message.room_id.clone())
            .or_default()
            .push(message);
    }

    /// The latest `limit` messages, oldest first.
    pub fn list_recent(&self, room_id: &RoomId, limit: usize) -> Vec<ChatMessage> {
        let Some(log) = self.messages.get(room_id) else {
            return Vec::new();
        };

        let skip = log.len().saturating_sub(limit);
        log.iter().skip(skip).cloned().collect()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
