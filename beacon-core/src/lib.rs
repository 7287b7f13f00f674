//! Shared data model for the beacon screen-sharing stack.
//!
//! Everything here is plain data: identifiers, signal records, room and
//! message models, and the wire DTOs exchanged over the relay HTTP API.
//! Server and client crates both build on these types.

pub mod model;
pub mod time;
pub mod wire;

pub use model::{
    ChatMessage, FileId, IceCandidateInit, IceServerConfig, MessageId, MessageKind, Participant,
    Role, Room, RoomId, SdpKind, SessionDescription, SignalId, SignalKind, SignalRecord, StoredFile,
    UserId,
};
