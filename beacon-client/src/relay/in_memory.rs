use crate::error::RelayError;
use crate::relay::SignalRelay;
use async_trait::async_trait;
use beacon_core::model::{RoomId, SignalId, SignalKind, SignalRecord, UserId};
use beacon_core::time::unix_millis;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shared signal log for relays living in one process.
///
/// Implements the same append/visibility/ack semantics as the relay
/// server, so two sessions can negotiate without any HTTP in between.
/// Mostly used by tests; also handy for embedding host and viewer in a
/// single binary.
pub struct InMemoryHub {
    records: Mutex<Vec<SignalRecord>>,
}

impl InMemoryHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
        })
    }

    /// A relay handle bound to one participant identity.
    pub fn relay_for(self: &Arc<Self>, user_id: UserId) -> InMemoryRelay {
        InMemoryRelay {
            hub: self.clone(),
            user_id,
        }
    }

    /// Every record for a room, any processed state, insertion order.
    pub fn room_log(&self, room: &RoomId) -> Vec<SignalRecord> {
        self.records
            .lock()
            .expect("signal log poisoned")
            .iter()
            .filter(|r| &r.room_id == room)
            .cloned()
            .collect()
    }
}

/// [`SignalRelay`] over an [`InMemoryHub`], carrying one caller identity.
#[derive(Clone)]
pub struct InMemoryRelay {
    hub: Arc<InMemoryHub>,
    user_id: UserId,
}

impl InMemoryRelay {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

#[async_trait]
impl SignalRelay for InMemoryRelay {
    async fn send(
        &self,
        room: &RoomId,
        to: Option<UserId>,
        kind: SignalKind,
        payload: String,
    ) -> Result<SignalId, RelayError> {
        if payload.is_empty() {
            return Err(RelayError::Validation("empty signal payload".to_string()));
        }

        let record = SignalRecord {
            id: SignalId::new(),
            room_id: room.clone(),
            from_user_id: self.user_id.clone(),
            to_user_id: to,
            kind,
            payload,
            processed: false,
            created_at: unix_millis(),
        };
        let id = record.id.clone();

        debug!("in-memory signal {} ({}) stored", id, kind.as_str());
        self.hub
            .records
            .lock()
            .expect("signal log poisoned")
            .push(record);
        Ok(id)
    }

    async fn poll(&self, room: &RoomId) -> Result<Vec<SignalRecord>, RelayError> {
        let records = self.hub.records.lock().expect("signal log poisoned");
        let in_room = || records.iter().filter(|r| &r.room_id == room && !r.processed);

        // Direct records first, broadcasts after, as the server orders them.
        let mut visible: Vec<SignalRecord> = in_room()
            .filter(|r| r.to_user_id.as_ref() == Some(&self.user_id))
            .cloned()
            .collect();
        visible.extend(
            in_room()
                .filter(|r| r.is_broadcast() && r.from_user_id != self.user_id)
                .cloned(),
        );
        Ok(visible)
    }

    async fn ack(&self, signal: &SignalId) -> Result<(), RelayError> {
        let mut records = self.hub.records.lock().expect("signal log poisoned");
        match records.iter_mut().find(|r| &r.id == signal) {
            Some(record) => {
                record.processed = true;
                Ok(())
            }
            None => Err(RelayError::NotFound(format!("signal {signal}"))),
        }
    }
}
