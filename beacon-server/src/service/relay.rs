use crate::error::ServerError;
use crate::store::{RoomStore, SignalStore};
use beacon_core::model::{RoomId, SignalId, SignalKind, SignalRecord, UserId};
use std::sync::Arc;
use tracing::debug;

/// Store-and-poll relay for signaling envelopes.
///
/// The relay never pushes: senders append records, consumers poll for what
/// is addressed to them and ack each record once handled. The caller
/// identity always becomes `from_user_id`, so a sender cannot impersonate
/// another user.
#[derive(Clone)]
pub struct RelayService {
    signals: Arc<SignalStore>,
    rooms: Arc<RoomStore>,
}

impl RelayService {
    pub fn new(signals: Arc<SignalStore>, rooms: Arc<RoomStore>) -> Self {
        Self { signals, rooms }
    }

    /// Append a record. `to_user_id: None` broadcasts to the rest of the
    /// room; `Some` addresses exactly one user.
    pub fn send(
        &self,
        room_id: &RoomId,
        from: &UserId,
        to: Option<UserId>,
        kind: SignalKind,
        payload: String,
    ) -> Result<SignalId, ServerError> {
        if self.rooms.get(room_id).is_none() {
            return Err(ServerError::not_found("room", room_id));
        }

        let record = self.signals.insert(
            room_id.clone(),
            from.clone(),
            to,
            kind,
            payload,
        )?;

        debug!(
            "signal {} ({}) stored for room {:?}",
            record.id,
            kind.as_str(),
            room_id
        );
        Ok(record.id)
    }

    /// Everything `caller` should consume right now: unprocessed records
    /// addressed to them, then unprocessed broadcasts they did not author.
    /// Polling never changes any record.
    pub fn poll(&self, room_id: &RoomId, caller: &UserId) -> Result<Vec<SignalRecord>, ServerError> {
        if self.rooms.get(room_id).is_none() {
            return Err(ServerError::not_found("room", room_id));
        }

        let mut visible = self.signals.list_for_recipient(room_id, caller);
        visible.extend(
            self.signals
                .list_by_room(room_id)
                .into_iter()
                .filter(|r| r.is_broadcast() && !r.processed && &r.from_user_id != caller),
        );

        debug!("poll for {:?} in {:?}: {} records", caller, room_id, visible.len());
        Ok(visible)
    }

    /// Mark a record consumed. Safe to repeat; any authenticated caller
    /// may ack since re-acking is harmless.
    pub fn ack(&self, signal_id: &SignalId) -> Result<(), ServerError> {
        self.signals.mark_processed(signal_id)
    }
}
