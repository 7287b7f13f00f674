use crate::error::SessionError;
use crate::relay::SignalRelay;
use crate::transport::{ConnectivityState, PeerTransport};
use beacon_core::model::{
    IceCandidateInit, Role, RoomId, SessionDescription, SignalId, SignalKind, SignalRecord, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where one participant's negotiation currently stands.
///
/// `Offering` is host-only, `AwaitingOffer` viewer-only; `Failed` is
/// reachable from any non-idle state and only an explicit stop (then
/// restart) leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Offering,
    AwaitingOffer,
    Connecting,
    Connected,
    Failed,
    Closed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Failed | SessionState::Closed)
    }
}

/// Per-participant negotiation machine.
///
/// Consumes the signal stream one record at a time and drives the local
/// peer connection; emits offer/answer/candidate records back through the
/// relay. Constructed once capture has succeeded, so it starts in
/// `Capturing`. Acking consumed records is the caller's job: every record
/// fed in is consumed, even when a state guard ignored it.
pub struct Negotiator {
    room_id: RoomId,
    user_id: UserId,
    role: Role,
    relay: Arc<dyn SignalRelay>,
    transport: Arc<dyn PeerTransport>,
    state: SessionState,
    /// Set after the first completed description exchange; later offers
    /// and answers from anyone are ignored.
    remote_peer: Option<UserId>,
    remote_description_set: bool,
    /// Candidates that arrived before the remote description; flushed
    /// right after it is applied.
    pending_candidates: Vec<IceCandidateInit>,
    send_retry_backoff: Duration,
}

impl Negotiator {
    pub fn new(
        room_id: RoomId,
        user_id: UserId,
        role: Role,
        relay: Arc<dyn SignalRelay>,
        transport: Arc<dyn PeerTransport>,
        send_retry_backoff: Duration,
    ) -> Self {
        Self {
            room_id,
            user_id,
            role,
            relay,
            transport,
            state: SessionState::Capturing,
            remote_peer: None,
            remote_description_set: false,
            pending_candidates: Vec::new(),
            send_retry_backoff,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn remote_peer(&self) -> Option<&UserId> {
        self.remote_peer.as_ref()
    }

    /// Leave `Capturing`: a host creates and broadcasts its offer, a
    /// viewer just starts waiting for one.
    pub async fn begin(&mut self) -> Result<(), SessionError> {
        match self.role {
            Role::Host => {
                let offer = match self.transport.create_offer().await {
                    Ok(offer) => offer,
                    Err(e) => return Err(self.fail(format!("create offer: {e}"))),
                };
                let payload = match offer.to_payload() {
                    Ok(payload) => payload,
                    Err(e) => return Err(self.fail(format!("encode offer: {e}"))),
                };
                self.send_with_retry(None, SignalKind::Offer, payload)
                    .await?;
                self.state = SessionState::Offering;
                info!("offer broadcast, awaiting answer");
            }
            Role::Viewer => {
                self.state = SessionState::AwaitingOffer;
                debug!("viewer waiting for offer");
            }
        }
        Ok(())
    }

    /// Feed one polled record through the machine. Records that no
    /// transition wants (stale, duplicate, self-authored, informational)
    /// are ignored; the caller still acks them.
    pub async fn handle_signal(&mut self, record: &SignalRecord) -> Result<(), SessionError> {
        if self.state.is_terminal() {
            debug!("ignoring {} signal in {:?}", record.kind.as_str(), self.state);
            return Ok(());
        }
        // The relay already hides our own records; guard anyway.
        if record.from_user_id == self.user_id {
            debug!("ignoring self-authored {} record", record.kind.as_str());
            return Ok(());
        }

        match record.kind {
            SignalKind::Offer => self.handle_offer(record).await,
            SignalKind::Answer => self.handle_answer(record).await,
            SignalKind::IceCandidate => self.handle_candidate(record).await,
            SignalKind::Join | SignalKind::Leave => {
                debug!(
                    "{} {} the room",
                    record.from_user_id,
                    if record.kind == SignalKind::Join {
                        "joined"
                    } else {
                        "left"
                    }
                );
                Ok(())
            }
        }
    }

    async fn handle_offer(&mut self, record: &SignalRecord) -> Result<(), SessionError> {
        if self.role != Role::Viewer || self.state != SessionState::AwaitingOffer {
            debug!(
                "ignoring offer from {} in {:?} as {}",
                record.from_user_id,
                self.state,
                self.role.as_str()
            );
            return Ok(());
        }

        let offer = match SessionDescription::from_payload(&record.payload) {
            Ok(offer) => offer,
            Err(e) => return Err(self.fail(format!("malformed offer payload: {e}"))),
        };
        if let Err(e) = self.transport.set_remote_description(&offer).await {
            return Err(self.fail(format!("apply offer: {e}")));
        }
        self.remote_description_set = true;
        self.flush_pending_candidates().await?;

        let answer = match self.transport.create_answer().await {
            Ok(answer) => answer,
            Err(e) => return Err(self.fail(format!("create answer: {e}"))),
        };
        let payload = match answer.to_payload() {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(format!("encode answer: {e}"))),
        };
        self.send_with_retry(
            Some(record.from_user_id.clone()),
            SignalKind::Answer,
            payload,
        )
        .await?;

        self.remote_peer = Some(record.from_user_id.clone());
        self.state = SessionState::Connecting;
        info!("answered offer from {}", record.from_user_id);
        Ok(())
    }

    async fn handle_answer(&mut self, record: &SignalRecord) -> Result<(), SessionError> {
        if self.role != Role::Host || self.state != SessionState::Offering {
            debug!(
                "ignoring answer from {} in {:?} as {}",
                record.from_user_id,
                self.state,
                self.role.as_str()
            );
            return Ok(());
        }

        let answer = match SessionDescription::from_payload(&record.payload) {
            Ok(answer) => answer,
            Err(e) => return Err(self.fail(format!("malformed answer payload: {e}"))),
        };
        if let Err(e) = self.transport.set_remote_description(&answer).await {
            return Err(self.fail(format!("apply answer: {e}")));
        }
        self.remote_description_set = true;
        self.flush_pending_candidates().await?;

        self.remote_peer = Some(record.from_user_id.clone());
        self.state = SessionState::Connecting;
        info!("answer from {} applied", record.from_user_id);
        Ok(())
    }

    /// Candidates are independent of the offer/answer transitions, but
    /// applying one before the remote description exists may be refused
    /// by the transport, so early arrivals are buffered instead.
    async fn handle_candidate(&mut self, record: &SignalRecord) -> Result<(), SessionError> {
        let candidate = match IceCandidateInit::from_payload(&record.payload) {
            Ok(candidate) => candidate,
            Err(e) => return Err(self.fail(format!("malformed candidate payload: {e}"))),
        };

        if !self.remote_description_set {
            debug!("buffering early candidate from {}", record.from_user_id);
            self.pending_candidates.push(candidate);
            return Ok(());
        }

        if let Err(e) = self.transport.add_ice_candidate(&candidate).await {
            return Err(self.fail(format!("apply candidate: {e}")));
        }
        Ok(())
    }

    async fn flush_pending_candidates(&mut self) -> Result<(), SessionError> {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.transport.add_ice_candidate(&candidate).await {
                return Err(self.fail(format!("apply buffered candidate: {e}")));
            }
        }
        Ok(())
    }

    /// Relay a locally gathered candidate to the peer: direct once we
    /// know who they are, broadcast before that.
    pub async fn send_local_candidate(
        &mut self,
        candidate: IceCandidateInit,
    ) -> Result<(), SessionError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        let payload = match candidate.to_payload() {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(format!("encode candidate: {e}"))),
        };
        self.send_with_retry(self.remote_peer.clone(), SignalKind::IceCandidate, payload)
            .await?;
        Ok(())
    }

    /// Track the transport's own connectivity. `Connected` and `Failed`
    /// are the only readings that move the machine.
    pub fn observe_connectivity(&mut self, state: ConnectivityState) -> Result<(), SessionError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        match state {
            ConnectivityState::Connected => {
                info!("peer connection is up");
                self.state = SessionState::Connected;
                Ok(())
            }
            ConnectivityState::Failed => {
                self.state = SessionState::Failed;
                Err(SessionError::TransportFailure)
            }
            other => {
                debug!("connectivity now {other:?}");
                Ok(())
            }
        }
    }

    /// Explicit stop. No record is consumed after this.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        self.pending_candidates.clear();
    }

    /// One retry with backoff, then the failure surfaces and the machine
    /// parks in `Failed`.
    async fn send_with_retry(
        &mut self,
        to: Option<UserId>,
        kind: SignalKind,
        payload: String,
    ) -> Result<SignalId, SessionError> {
        match self
            .relay
            .send(&self.room_id, to.clone(), kind, payload.clone())
            .await
        {
            Ok(id) => Ok(id),
            Err(first) => {
                warn!("send {} failed ({first}), retrying once", kind.as_str());
                tokio::time::sleep(self.send_retry_backoff).await;
                match self.relay.send(&self.room_id, to, kind, payload).await {
                    Ok(id) => Ok(id),
                    Err(second) => Err(self.fail(format!(
                        "send {} failed after retry: {second}",
                        kind.as_str()
                    ))),
                }
            }
        }
    }

    fn fail(&mut self, reason: String) -> SessionError {
        warn!("negotiation failed: {reason}");
        self.state = SessionState::Failed;
        SessionError::Negotiation(reason)
    }
}
