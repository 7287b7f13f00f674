mod http_relay;
mod in_memory;

pub use http_relay::*;
pub use in_memory::*;

use crate::error::RelayError;
use async_trait::async_trait;
use beacon_core::model::{RoomId, SignalId, SignalKind, SignalRecord, UserId};

/// Client-side seam over the signaling relay.
///
/// Implementations carry the caller's identity; `send` always records the
/// caller as the author and `poll` returns what the caller may consume.
#[async_trait]
pub trait SignalRelay: Send + Sync {
    async fn send(
        &self,
        room: &RoomId,
        to: Option<UserId>,
        kind: SignalKind,
        payload: String,
    ) -> Result<SignalId, RelayError>;

    /// Unconsumed records addressed to the caller or broadcast by others.
    /// Reading must not consume; see [`SignalRelay::ack`].
    async fn poll(&self, room: &RoomId) -> Result<Vec<SignalRecord>, RelayError>;

    /// Mark a record consumed so later polls skip it. Idempotent.
    async fn ack(&self, signal: &SignalId) -> Result<(), RelayError>;
}
