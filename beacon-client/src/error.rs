use thiserror::Error;

/// Relay API failures as seen by the client.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    #[error("not authenticated")]
    Unauthorized,
    #[error("rejected: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("relay unreachable: {0}")]
    Transport(String),
}

/// Local media acquisition failures.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("capture permission denied")]
    PermissionDenied,
    #[error("no capture source available")]
    SourceUnavailable,
    #[error("capture device error: {0}")]
    Device(String),
}

/// Peer connection failures reported by the transport layer.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("peer connection: {0}")]
    Connection(String),
    #[error("peer connection closed")]
    Closed,
}

/// What a media session surfaces to its owner. `Capture` leaves the
/// session restartable; the other two park it in `Failed` until an
/// explicit stop and restart.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("negotiation failed: {0}")]
    Negotiation(String),
    #[error("peer connection reported failure")]
    TransportFailure,
}
