use crate::error::SessionError;
use crate::media::{CaptureSource, LocalMediaStream, LocalTrack, RemoteTrackInfo};
use crate::negotiation::{Negotiator, SessionState};
use crate::relay::SignalRelay;
use crate::transport::{PeerTransport, TransportConfig, TransportEvent, TransportFactory};
use beacon_core::model::{Role, RoomId, SignalKind, UserId};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct SessionConfig {
    /// How often the driver asks the relay for new records.
    pub poll_interval: Duration,
    /// Pause before the single retry of a failed relay send.
    pub send_retry_backoff: Duration,
    pub transport: TransportConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            send_retry_backoff: Duration::from_millis(250),
            transport: TransportConfig::default(),
        }
    }
}

/// What a running session reports to whoever started it.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(SessionState),
    RemoteTrack(RemoteTrackInfo),
    Error(SessionError),
}

struct SharedState {
    state: SessionState,
    remote_tracks: Vec<RemoteTrackInfo>,
}

struct Running {
    stop_tx: watch::Sender<bool>,
    driver: JoinHandle<()>,
    transport: Arc<dyn PeerTransport>,
    stream: LocalMediaStream,
}

/// One participant's media session: owns the capture stream and the peer
/// connection lifecycle, runs the poll/ack driver, and surfaces state
/// changes and errors as [`SessionEvent`]s.
///
/// The transport object never leaves this controller; callers only see
/// stream handles and events. `stop` is idempotent and safe in any state,
/// and cancels the driver before any further transition can happen.
pub struct MediaSession {
    relay: Arc<dyn SignalRelay>,
    capture: Arc<dyn CaptureSource>,
    transports: Arc<dyn TransportFactory>,
    config: SessionConfig,
    room_id: RoomId,
    user_id: UserId,
    role: Role,
    shared: Arc<Mutex<SharedState>>,
    running: Mutex<Option<Running>>,
}

impl MediaSession {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        relay: Arc<dyn SignalRelay>,
        capture: Arc<dyn CaptureSource>,
        transports: Arc<dyn TransportFactory>,
        config: SessionConfig,
        room_id: RoomId,
        user_id: UserId,
        role: Role,
    ) -> Self {
        Self {
            relay,
            capture,
            transports,
            config,
            room_id,
            user_id,
            role,
            shared: Arc::new(Mutex::new(SharedState {
                state: SessionState::Idle,
                remote_tracks: Vec::new(),
            })),
            running: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().expect("session state poisoned").state
    }

    pub fn remote_tracks(&self) -> Vec<RemoteTrackInfo> {
        self.shared
            .lock()
            .expect("session state poisoned")
            .remote_tracks
            .clone()
    }

    /// Handles to the captured tracks, for local preview rendering.
    pub fn local_tracks(&self) -> Vec<LocalTrack> {
        self.running
            .lock()
            .expect("session runtime poisoned")
            .as_ref()
            .map(|r| r.stream.tracks.clone())
            .unwrap_or_default()
    }

    /// Acquire capture, build the peer connection and start negotiating.
    ///
    /// Returns the event stream of the new session. Capture failure
    /// leaves the session in `Idle` with nothing sent; later failures
    /// park it in `Failed` until `stop` is called.
    pub async fn start(&self) -> Result<mpsc::Receiver<SessionEvent>, SessionError> {
        if self.running.lock().expect("session runtime poisoned").is_some() {
            return Err(SessionError::Negotiation(
                "session already running".to_string(),
            ));
        }

        let stream = match self.capture.capture().await {
            Ok(stream) => stream,
            Err(e) => {
                self.set_state(SessionState::Idle);
                return Err(SessionError::Capture(e));
            }
        };
        self.set_state(SessionState::Capturing);
        info!("capture acquired ({} tracks)", stream.tracks.len());

        let (transport_tx, transport_rx) = mpsc::channel(64);
        let transport = match self.transports.create(&self.config.transport, transport_tx).await {
            Ok(transport) => transport,
            Err(e) => {
                self.set_state(SessionState::Failed);
                return Err(SessionError::Negotiation(format!(
                    "create peer connection: {e}"
                )));
            }
        };
        for track in &stream.tracks {
            if let Err(e) = transport.add_local_track(track.clone()).await {
                let _ = transport.close().await;
                self.set_state(SessionState::Failed);
                return Err(SessionError::Negotiation(format!("add local track: {e}")));
            }
        }

        // Presence marker; consumers log and ack it without a transition.
        if let Err(e) = self
            .relay
            .send(&self.room_id, None, SignalKind::Join, "{}".to_string())
            .await
        {
            warn!("join record not sent: {e}");
        }

        let mut negotiator = Negotiator::new(
            self.room_id.clone(),
            self.user_id.clone(),
            self.role,
            self.relay.clone(),
            transport.clone(),
            self.config.send_retry_backoff,
        );
        if let Err(e) = negotiator.begin().await {
            let _ = transport.close().await;
            self.set_state(SessionState::Failed);
            return Err(e);
        }
        self.set_state(negotiator.state());

        let (event_tx, event_rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = watch::channel(false);
        let driver = tokio::spawn(drive(
            negotiator,
            self.relay.clone(),
            self.room_id.clone(),
            self.shared.clone(),
            event_tx,
            transport_rx,
            stop_rx,
            self.config.poll_interval,
        ));

        *self.running.lock().expect("session runtime poisoned") = Some(Running {
            stop_tx,
            driver,
            transport,
            stream,
        });
        Ok(event_rx)
    }

    /// Tear everything down: cancel the driver, send a best-effort leave
    /// marker, close the peer connection, stop capture. Safe to call
    /// repeatedly and in any state; signals arriving afterwards are never
    /// processed.
    pub async fn stop(&self) {
        let running = self.running.lock().expect("session runtime poisoned").take();
        let Some(mut running) = running else {
            debug!("stop on a session that is not running");
            return;
        };

        // Cancel first so no in-flight record causes another transition.
        let _ = running.stop_tx.send(true);
        let _ = running.driver.await;

        if let Err(e) = self
            .relay
            .send(&self.room_id, None, SignalKind::Leave, "{}".to_string())
            .await
        {
            warn!("leave record not sent: {e}");
        }

        if let Err(e) = running.transport.close().await {
            warn!("closing peer connection: {e}");
        }
        running.stream.stop();

        let mut shared = self.shared.lock().expect("session state poisoned");
        shared.state = SessionState::Closed;
        shared.remote_tracks.clear();
        info!("session closed");
    }

    fn set_state(&self, state: SessionState) {
        self.shared.lock().expect("session state poisoned").state = state;
    }
}

/// Driver loop: poll-dispatch-ack on a timer, transport events as they
/// come, until stopped. Every polled record is acked exactly once,
/// whatever the machine did with it.
#[allow(clippy::too_many_arguments)]
async fn drive(
    mut negotiator: Negotiator,
    relay: Arc<dyn SignalRelay>,
    room_id: RoomId,
    shared: Arc<Mutex<SharedState>>,
    events: mpsc::Sender<SessionEvent>,
    mut transport_rx: mpsc::Receiver<TransportEvent>,
    mut stop_rx: watch::Receiver<bool>,
    poll_interval: Duration,
) {
    let mut ticker = tokio::time::interval(poll_interval);

    'driver: loop {
        tokio::select! {
            _ = stop_rx.changed() => {
                debug!("driver cancelled");
                break;
            }

            _ = ticker.tick() => {
                let records = match relay.poll(&room_id).await {
                    Ok(records) => records,
                    Err(e) => {
                        warn!("poll failed: {e}");
                        continue;
                    }
                };
                for record in records {
                    // A stop that landed while this batch was in flight
                    // cancels the rest of it; unacked records simply
                    // surface again for whoever polls next.
                    if *stop_rx.borrow() {
                        debug!("driver cancelled mid-batch");
                        break 'driver;
                    }
                    let outcome = negotiator.handle_signal(&record).await;
                    if let Err(e) = relay.ack(&record.id).await {
                        warn!("ack {} failed: {e}", record.id);
                    }
                    if let Err(e) = outcome {
                        let _ = events.send(SessionEvent::Error(e)).await;
                    }
                    publish_state(&negotiator, &shared, &events).await;
                }
            }

            event = transport_rx.recv() => {
                let Some(event) = event else {
                    debug!("transport event channel closed");
                    break;
                };
                match event {
                    TransportEvent::CandidateGenerated(candidate) => {
                        if let Err(e) = negotiator.send_local_candidate(candidate).await {
                            let _ = events.send(SessionEvent::Error(e)).await;
                        }
                    }
                    TransportEvent::Connectivity(state) => {
                        if let Err(e) = negotiator.observe_connectivity(state) {
                            let _ = events.send(SessionEvent::Error(e)).await;
                        }
                    }
                    TransportEvent::RemoteTrack(info) => {
                        shared
                            .lock()
                            .expect("session state poisoned")
                            .remote_tracks
                            .push(info.clone());
                        let _ = events.send(SessionEvent::RemoteTrack(info)).await;
                    }
                }
                publish_state(&negotiator, &shared, &events).await;
            }
        }
    }
}

async fn publish_state(
    negotiator: &Negotiator,
    shared: &Arc<Mutex<SharedState>>,
    events: &mpsc::Sender<SessionEvent>,
) {
    let state = negotiator.state();
    let changed = {
        let mut shared = shared.lock().expect("session state poisoned");
        if shared.state == state {
            false
        } else {
            shared.state = state;
            true
        }
    };
    if changed {
        let _ = events.send(SessionEvent::StateChanged(state)).await;
    }
}
