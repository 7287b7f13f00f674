use crate::error::CaptureError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use webrtc::api::media_engine::MIME_TYPE_VP8;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// A local media track ready to be attached to a peer connection.
#[derive(Clone)]
pub struct LocalTrack(pub Arc<dyn TrackLocal + Send + Sync>);

/// The capture output owned by one media session.
///
/// Holds the tracks fed into the peer connection plus the background task
/// (if any) that keeps them supplied with frames. `stop` tears the feed
/// down; dropping the stream does the same.
pub struct LocalMediaStream {
    pub id: String,
    pub tracks: Vec<LocalTrack>,
    pump: Option<JoinHandle<()>>,
}

impl LocalMediaStream {
    pub fn new(id: String, tracks: Vec<LocalTrack>, pump: Option<JoinHandle<()>>) -> Self {
        Self { id, tracks, pump }
    }

    /// Stop feeding frames. Idempotent.
    pub fn stop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
            debug!("local stream {} stopped", self.id);
        }
    }
}

impl Drop for LocalMediaStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// What we know about a track the remote peer is sending us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrackInfo {
    pub id: String,
    pub kind: String,
    pub stream_id: String,
}

/// Seam over local media acquisition. The real thing is a platform screen
/// or camera grabber; tests substitute sources that fail or produce
/// nothing.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    async fn capture(&self) -> Result<LocalMediaStream, CaptureError>;
}

/// Capture source that emits a blank VP8 video feed at a fixed frame rate.
///
/// Stands in for real screen capture so a full host/viewer negotiation can
/// run end to end from a terminal.
pub struct SyntheticCapture {
    frame_interval: Duration,
}

impl SyntheticCapture {
    pub fn new() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
        }
    }
}

impl Default for SyntheticCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureSource for SyntheticCapture {
    async fn capture(&self) -> Result<LocalMediaStream, CaptureError> {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
            "video".to_owned(),
            "beacon-screen".to_owned(),
        ));

        let writer = track.clone();
        let frame_interval = self.frame_interval;
        let pump = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame_interval);
            loop {
                ticker.tick().await;
                let sample = Sample {
                    data: Bytes::from_static(&[0u8; 16]),
                    duration: frame_interval,
                    ..Default::default()
                };
                if writer.write_sample(&sample).await.is_err() {
                    // Track unbound; the connection is gone.
                    break;
                }
            }
        });

        Ok(LocalMediaStream::new(
            "beacon-screen".to_owned(),
            vec![LocalTrack(track)],
            Some(pump),
        ))
    }
}
