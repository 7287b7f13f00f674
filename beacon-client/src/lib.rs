//! Client side of the beacon stack: the relay client, the peer-transport
//! seam over WebRTC, the negotiation state machine and the media session
//! controller that ties them together.
//!
//! A participant builds a [`MediaSession`] from a [`SignalRelay`], a
//! [`CaptureSource`] and a [`TransportFactory`], calls `start`, watches
//! the event stream, and calls `stop` when done. Hosts offer, viewers
//! answer; everything in between travels as signal records through the
//! relay.

pub mod error;
pub mod media;
pub mod negotiation;
pub mod relay;
pub mod session;
pub mod transport;

pub use error::{CaptureError, RelayError, SessionError, TransportError};
pub use media::{CaptureSource, LocalMediaStream, LocalTrack, RemoteTrackInfo, SyntheticCapture};
pub use negotiation::{Negotiator, SessionState};
pub use relay::{HttpRelay, InMemoryHub, InMemoryRelay, SignalRelay};
pub use session::{MediaSession, SessionConfig, SessionEvent};
pub use transport::{
    ConnectivityState, PeerTransport, TransportConfig, TransportEvent, TransportFactory,
    WebRtcFactory, WebRtcTransport,
};
