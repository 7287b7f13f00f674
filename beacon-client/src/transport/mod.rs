mod webrtc_transport;

pub use webrtc_transport::*;

use crate::error::TransportError;
use crate::media::{LocalTrack, RemoteTrackInfo};
use async_trait::async_trait;
use beacon_core::model::{IceCandidateInit, IceServerConfig, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Peer connection settings shared by every transport instance a client
/// creates.
#[derive(Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
        }
    }
}

/// Connectivity as reported by the underlying peer connection. The
/// negotiation layer only observes these; it never requests them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Asynchronous output of a peer connection, delivered over the event
/// channel handed to the transport at creation.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connectivity(ConnectivityState),
    /// A locally gathered ICE candidate that must be relayed to the peer.
    CandidateGenerated(IceCandidateInit),
    /// The remote peer started sending a media track.
    RemoteTrack(RemoteTrackInfo),
}

/// The transport primitive the negotiation machine drives: create and
/// apply descriptions, feed candidates, close. Everything else (candidate
/// gathering, connectivity probing) happens behind the seam and surfaces
/// as [`TransportEvent`]s.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn add_local_track(&self, track: LocalTrack) -> Result<(), TransportError>;

    /// Create an offer and install it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    /// Create an answer and install it as the local description. Valid
    /// only after a remote offer has been applied.
    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_remote_description(
        &self,
        desc: &SessionDescription,
    ) -> Result<(), TransportError>;

    async fn add_ice_candidate(&self, candidate: &IceCandidateInit) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Builds one transport per session start, wiring its events into the
/// session's channel.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
