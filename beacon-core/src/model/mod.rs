mod ids;
mod message;
mod room;
mod signal;

pub use ids::{FileId, MessageId, RoomId, SignalId, UserId};
pub use message::{ChatMessage, MessageKind, StoredFile};
pub use room::{Participant, Role, Room};
pub use signal::{
    IceCandidateInit, IceServerConfig, SdpKind, SessionDescription, SignalKind, SignalRecord,
};
