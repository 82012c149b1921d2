use async_trait::async_trait;
use tagsight_model::CaptureConstraints;

use crate::capture::stream::MediaStream;
use crate::error::Result;

/// Camera acquisition port. Implementations wrap whatever the platform
/// offers for requesting a camera; the subsystem only sees the stream
/// handle that comes back.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Request a stream honoring the given constraints.
    ///
    /// Fails with [`ScanError::PermissionDenied`](crate::ScanError::PermissionDenied)
    /// when the user or platform refuses access, and with
    /// [`ScanError::DeviceUnavailable`](crate::ScanError::DeviceUnavailable)
    /// when no usable camera exists. Both are terminal for the attempt;
    /// callers surface a retry affordance instead of retrying here.
    async fn open(&self, constraints: &CaptureConstraints) -> Result<MediaStream>;
}
