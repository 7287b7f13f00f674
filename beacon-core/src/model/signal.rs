use crate::model::ids::{RoomId, SignalId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// STUN/TURN server entry handed to peers before they negotiate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: &str) -> Self {
        Self {
            urls: vec![url.to_string()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
    Join,
    Leave,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
            SignalKind::Join => "join",
            SignalKind::Leave => "leave",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored signaling envelope.
///
/// A record with `to_user_id: Some(..)` is addressed to exactly one consumer;
/// `None` means every room member except the author may consume it. The
/// `processed` flag is the only consumption marker: nothing is ever deleted
/// while the room lives, and readers must skip processed records everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRecord {
    pub id: SignalId,
    pub room_id: RoomId,
    pub from_user_id: UserId,
    pub to_user_id: Option<UserId>,
    pub kind: SignalKind,
    pub payload: String,
    pub processed: bool,
    pub created_at: u64,
}

impl SignalRecord {
    /// Visibility rule for polling: unprocessed, and either addressed
    /// directly to `consumer` or broadcast by someone else.
    pub fn is_visible_to(&self, consumer: &UserId) -> bool {
        if self.processed {
            return false;
        }
        match &self.to_user_id {
            Some(target) => target == consumer,
            None => &self.from_user_id != consumer,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.to_user_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// SDP payload carried inside offer/answer signal records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: String) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp,
        }
    }

    pub fn answer(sdp: String) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp,
        }
    }

    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Trickle ICE candidate as carried inside ice-candidate signal records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidateInit {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidateInit {
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
