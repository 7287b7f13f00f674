use crate::error::ServerError;
use beacon_core::model::{RoomId, SignalId, SignalKind, SignalRecord, UserId};
use beacon_core::time::unix_millis;
use dashmap::DashMap;

/// Append-only store of signaling envelopes, one log per room.
///
/// Records are never deleted. Consumption is tracked exclusively through
/// the `processed` flag, so acking late or twice is harmless and a crashed
/// consumer sees its records again on the next poll.
pub struct SignalStore {
    rooms: DashMap<RoomId, Vec<SignalRecord>>,
    // Maps a signal id back to its room so acks don't scan every log.
    locator: DashMap<SignalId, RoomId>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            locator: DashMap::new(),
        }
    }

    /// Append a new record to the room log.
    ///
    /// The payload is opaque to the store but must be non-empty; an empty
    /// payload is always a caller bug.
    pub fn insert(
        &self,
        room_id: RoomId,
        from_user_id: UserId,
        to_user_id: Option<UserId>,
        kind: SignalKind,
        payload: String,
    ) -> Result<SignalRecord, ServerError> {
        if payload.is_empty() {
            return Err(ServerError::validation("signal payload must not be empty"));
        }

        let record = SignalRecord {
            id: SignalId::new(),
            room_id: room_id.clone(),
            from_user_id,
            to_user_id,
            kind,
            payload,
            processed: false,
            created_at: unix_millis(),
        };

        self.locator.insert(record.id.clone(), room_id.clone());
        self.rooms.entry(room_id).or_default().push(record.clone());

        Ok(record)
    }

    /// Every record in the room, any processed state, insertion order.
    pub fn list_by_room(&self, room_id: &RoomId) -> Vec<SignalRecord> {
        self.rooms
            .get(room_id)
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Unprocessed records addressed directly to `recipient`, insertion order.
    pub fn list_for_recipient(&self, room_id: &RoomId, recipient: &UserId) -> Vec<SignalRecord> {
        let Some(log) = self.rooms.get(room_id) else {
            return Vec::new();
        };

        log.iter()
            .filter(|r| !r.processed && r.to_user_id.as_ref() == Some(recipient))
            .cloned()
            .collect()
    }

    /// Flip the `processed` flag. Acking an already-processed record is a
    /// no-op; acking an unknown id is an error.
    pub fn mark_processed(&self, signal_id: &SignalId) -> Result<(), ServerError> {
        let Some(room_id) = self.locator.get(signal_id).map(|r| r.clone()) else {
            return Err(ServerError::not_found("signal", signal_id));
        };

        if let Some(mut log) = self.rooms.get_mut(&room_id) {
            if let Some(record) = log.iter_mut().find(|r| &r.id == signal_id) {
                record.processed = true;
            }
        }

        Ok(())
    }
}

impl Default for SignalStore {
    fn default() -> Self {
        Self::new()
    }
}
