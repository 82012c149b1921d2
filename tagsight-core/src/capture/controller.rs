use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tagsight_model::CaptureConstraints;
use tracing::{debug, info, warn};

use crate::capture::device::CameraDevice;
use crate::capture::stream::MediaStream;
use crate::capture::surface::PreviewSurface;
use crate::error::{Result, ScanError};

/// Acquires and releases the camera stream and binds it to the preview
/// surface.
///
/// The camera is an exclusive resource: one controller holds at most one
/// live stream at a time, and a second `acquire` while a [`StreamGuard`] is
/// outstanding fails with [`ScanError::ScannerBusy`]. Release is scoped to
/// the guard (it releases on drop), so success, cancellation, error, and
/// teardown paths all clean up identically.
pub struct CaptureController {
    device: Arc<dyn CameraDevice>,
    surface: Arc<dyn PreviewSurface>,
    held: Arc<AtomicBool>,
}

impl CaptureController {
    pub fn new(
        device: Arc<dyn CameraDevice>,
        surface: Arc<dyn PreviewSurface>,
    ) -> Self {
        Self {
            device,
            surface,
            held: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a camera stream.
    ///
    /// No side effects until acquisition succeeds; on success the returned
    /// guard is the sole handle through which the stream is later released.
    pub async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<StreamGuard> {
        if self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ScanError::ScannerBusy(
                "a previously acquired stream has not been released".into(),
            ));
        }
        // The reservation frees the slot if `open` fails or if this future
        // is dropped mid-await (a dismissed permission prompt); only a
        // constructed guard takes the slot over.
        let reservation = SlotReservation::new(Arc::clone(&self.held));

        match self.device.open(constraints).await {
            Ok(stream) => {
                info!(
                    target: "capture",
                    stream = %stream.id(),
                    width = constraints.ideal_width,
                    height = constraints.ideal_height,
                    facing = %constraints.facing,
                    "camera stream acquired"
                );
                Ok(StreamGuard::new(
                    stream,
                    Arc::clone(&self.surface),
                    reservation.into_slot(),
                ))
            }
            Err(err) => {
                warn!(target: "capture", error = %err, "camera acquisition failed");
                Err(err)
            }
        }
    }

    /// Attach the guarded stream to the preview surface. Idempotent per
    /// acquired stream.
    pub fn bind(&self, guard: &mut StreamGuard) -> Result<()> {
        guard.bind()
    }

    /// Stop every track and detach the preview. Safe to call repeatedly;
    /// a released guard is a no-op.
    pub fn release(&self, guard: &mut StreamGuard) {
        guard.release();
    }
}

impl fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureController")
            .field("held", &self.held.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Claim on the controller slot while `open` is in flight.
///
/// Dropping the reservation frees the slot, which covers both a failed
/// `open` and an `acquire` future dropped mid-await.
/// [`SlotReservation::into_slot`] disarms it and passes the slot on to the
/// constructed [`StreamGuard`].
struct SlotReservation {
    held: Arc<AtomicBool>,
    armed: bool,
}

impl SlotReservation {
    fn new(held: Arc<AtomicBool>) -> Self {
        Self { held, armed: true }
    }

    fn into_slot(mut self) -> Arc<AtomicBool> {
        self.armed = false;
        Arc::clone(&self.held)
    }
}

impl Drop for SlotReservation {
    fn drop(&mut self) {
        if self.armed {
            self.held.store(false, Ordering::Release);
        }
    }
}

/// Scoped ownership of an acquired camera stream.
///
/// Dropping the guard releases the stream, so every exit path (including
/// unwinds) stops the tracks and detaches the preview, freeing the
/// controller for the next acquisition.
pub struct StreamGuard {
    stream: MediaStream,
    surface: Arc<dyn PreviewSurface>,
    held: Arc<AtomicBool>,
    bound: bool,
    released: bool,
}

impl StreamGuard {
    fn new(
        stream: MediaStream,
        surface: Arc<dyn PreviewSurface>,
        held: Arc<AtomicBool>,
    ) -> Self {
        Self {
            stream,
            surface,
            held,
            bound: false,
            released: false,
        }
    }

    pub fn stream(&self) -> &MediaStream {
        &self.stream
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Attach the stream to the preview surface. Re-binding an already
    /// bound stream is a no-op; binding a released stream is an error.
    pub fn bind(&mut self) -> Result<()> {
        if self.released {
            return Err(ScanError::Internal(
                "cannot bind a released stream".into(),
            ));
        }
        if self.bound {
            return Ok(());
        }
        self.surface.attach(&self.stream)?;
        self.bound = true;
        debug!(
            target: "capture",
            stream = %self.stream.id(),
            "stream bound to preview surface"
        );
        Ok(())
    }

    /// Stop every constituent track, detach the preview, and free the
    /// controller slot. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.stream.stop_all();
        if self.bound {
            self.surface.detach(self.stream.id());
            self.bound = false;
        }
        self.held.store(false, Ordering::Release);
        self.released = true;
        info!(
            target: "capture",
            stream = %self.stream.id(),
            "camera stream released"
        );
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for StreamGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamGuard")
            .field("stream", &self.stream.id())
            .field("bound", &self.bound)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use tagsight_model::StreamId;

    use super::*;
    use crate::capture::stream::MediaTrack;

    struct FakeCamera {
        tracks: Mutex<Vec<MediaTrack>>,
    }

    impl FakeCamera {
        fn new() -> Self {
            Self {
                tracks: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn open(
            &self,
            _constraints: &CaptureConstraints,
        ) -> Result<MediaStream> {
            let track = MediaTrack::new("video");
            self.tracks.lock().unwrap().push(track.clone());
            Ok(MediaStream::new(vec![track]))
        }
    }

    struct DeniedCamera;

    #[async_trait]
    impl CameraDevice for DeniedCamera {
        async fn open(
            &self,
            _constraints: &CaptureConstraints,
        ) -> Result<MediaStream> {
            Err(ScanError::PermissionDenied("denied by user".into()))
        }
    }

    /// Stalls the first `open` like an unanswered permission prompt, then
    /// behaves like a working camera.
    #[derive(Default)]
    struct PromptStallCamera {
        opens: AtomicUsize,
    }

    #[async_trait]
    impl CameraDevice for PromptStallCamera {
        async fn open(
            &self,
            _constraints: &CaptureConstraints,
        ) -> Result<MediaStream> {
            if self.opens.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok(MediaStream::new(vec![MediaTrack::new("video")]))
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        attached: Mutex<Vec<StreamId>>,
        detached: Mutex<Vec<StreamId>>,
    }

    impl PreviewSurface for RecordingSurface {
        fn attach(&self, stream: &MediaStream) -> Result<()> {
            self.attached.lock().unwrap().push(stream.id());
            Ok(())
        }

        fn detach(&self, stream: StreamId) {
            self.detached.lock().unwrap().push(stream);
        }
    }

    fn controller_with_fakes() -> (CaptureController, Arc<FakeCamera>, Arc<RecordingSurface>) {
        let camera = Arc::new(FakeCamera::new());
        let surface = Arc::new(RecordingSurface::default());
        let controller = CaptureController::new(camera.clone(), surface.clone());
        (controller, camera, surface)
    }

    #[tokio::test]
    async fn release_stops_tracks_and_is_idempotent() {
        let (controller, camera, surface) = controller_with_fakes();

        let mut guard = controller
            .acquire(&CaptureConstraints::default())
            .await
            .unwrap();
        guard.bind().unwrap();

        guard.release();
        guard.release();
        controller.release(&mut guard);

        let tracks = camera.tracks.lock().unwrap();
        assert!(tracks.iter().all(|t| !t.is_live()));
        assert_eq!(surface.detached.lock().unwrap().len(), 1);
        assert!(guard.is_released());
    }

    #[tokio::test]
    async fn drop_releases_the_stream() {
        let (controller, camera, _surface) = controller_with_fakes();

        {
            let _guard = controller
                .acquire(&CaptureConstraints::default())
                .await
                .unwrap();
        }

        let tracks = camera.tracks.lock().unwrap();
        assert!(tracks.iter().all(|t| !t.is_live()));
    }

    #[tokio::test]
    async fn bind_is_idempotent_per_stream() {
        let (controller, _camera, surface) = controller_with_fakes();

        let mut guard = controller
            .acquire(&CaptureConstraints::default())
            .await
            .unwrap();
        guard.bind().unwrap();
        guard.bind().unwrap();

        assert_eq!(surface.attached.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_acquire_is_busy_until_release() {
        let (controller, _camera, _surface) = controller_with_fakes();

        let mut guard = controller
            .acquire(&CaptureConstraints::default())
            .await
            .unwrap();

        let busy = controller.acquire(&CaptureConstraints::default()).await;
        assert!(matches!(busy, Err(ScanError::ScannerBusy(_))));

        guard.release();
        let reacquired = controller.acquire(&CaptureConstraints::default()).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn abandoned_acquisition_frees_the_slot() {
        let camera = Arc::new(PromptStallCamera::default());
        let surface = Arc::new(RecordingSurface::default());
        let controller = CaptureController::new(camera.clone(), surface);

        // Drop the acquire future while `open` is still pending, as when a
        // scan is cancelled during the permission prompt.
        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            controller.acquire(&CaptureConstraints::default()),
        )
        .await;
        assert!(abandoned.is_err());

        // The slot must be free again, not stuck reporting ScannerBusy.
        let guard = controller
            .acquire(&CaptureConstraints::default())
            .await
            .unwrap();
        assert_eq!(camera.opens.load(Ordering::SeqCst), 2);
        assert!(!guard.is_released());
    }

    #[tokio::test]
    async fn failed_acquisition_frees_the_slot() {
        let surface = Arc::new(RecordingSurface::default());
        let controller =
            CaptureController::new(Arc::new(DeniedCamera), surface);

        let denied = controller.acquire(&CaptureConstraints::default()).await;
        assert!(matches!(denied, Err(ScanError::PermissionDenied(_))));

        // The slot must not stay reserved after a failed attempt.
        let denied_again = controller.acquire(&CaptureConstraints::default()).await;
        assert!(matches!(denied_again, Err(ScanError::PermissionDenied(_))));
    }
}
