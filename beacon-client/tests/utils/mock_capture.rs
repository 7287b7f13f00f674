use async_trait::async_trait;
use beacon_client::error::CaptureError;
use beacon_client::media::{CaptureSource, LocalMediaStream};

/// Capture source for tests: either hands out an empty stream or refuses
/// as if the user denied permission.
pub struct MockCapture {
    deny: bool,
}

impl MockCapture {
    pub fn granting() -> Self {
        Self { deny: false }
    }

    pub fn denying() -> Self {
        Self { deny: true }
    }
}

#[async_trait]
impl CaptureSource for MockCapture {
    async fn capture(&self) -> Result<LocalMediaStream, CaptureError> {
        if self.deny {
            return Err(CaptureError::PermissionDenied);
        }
        Ok(LocalMediaStream::new("mock".to_string(), Vec::new(), None))
    }
}
