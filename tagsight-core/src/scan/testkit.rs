//! Hand-rolled fakes shared by the scan module's tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tagsight_model::{CaptureConstraints, PixelBuffer, ScanState};
use tokio::sync::watch;
use tokio::time::timeout;

use crate::capture::{CameraDevice, MediaStream, MediaTrack};
use crate::decode::{DecodeAttempt, DecodeEngine, EngineError};
use crate::error::Result;

pub(crate) const TICK: Duration = Duration::from_millis(1);
pub(crate) const WAIT: Duration = Duration::from_secs(5);

/// Camera fake that remembers every track it ever handed out.
pub(crate) struct ScriptedCamera {
    tracks: Mutex<Vec<MediaTrack>>,
}

impl ScriptedCamera {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            tracks: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn live_tracks(&self) -> usize {
        self.tracks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.is_live())
            .count()
    }

    pub(crate) fn stop_all_tracks(&self) {
        for track in self.tracks.lock().unwrap().iter() {
            track.stop();
        }
    }
}

#[async_trait]
impl CameraDevice for ScriptedCamera {
    async fn open(&self, _constraints: &CaptureConstraints) -> Result<MediaStream> {
        let track = MediaTrack::new("video");
        self.tracks.lock().unwrap().push(track.clone());
        Ok(MediaStream::new(vec![track]))
    }
}

/// Engine fake that plays back a fixed script of frame outcomes, then keeps
/// answering `NotFound`.
pub(crate) struct ScriptedEngine {
    script: Mutex<VecDeque<std::result::Result<DecodeAttempt, EngineError>>>,
    frame_calls: AtomicUsize,
}

impl ScriptedEngine {
    pub(crate) fn with_script(
        script: Vec<std::result::Result<DecodeAttempt, EngineError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            frame_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn endless_not_found() -> Arc<Self> {
        Self::with_script(Vec::new())
    }

    pub(crate) fn calls(&self) -> usize {
        self.frame_calls.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::time::sleep(TICK).await;
        }
    }
}

#[async_trait]
impl DecodeEngine for ScriptedEngine {
    async fn decode_frame(
        &self,
        _stream: &MediaStream,
    ) -> std::result::Result<DecodeAttempt, EngineError> {
        self.frame_calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(DecodeAttempt::NotFound))
    }

    async fn decode_pixels(
        &self,
        _buffer: &PixelBuffer,
    ) -> std::result::Result<DecodeAttempt, EngineError> {
        Ok(DecodeAttempt::NotFound)
    }
}

/// Block until the watched session state reaches `wanted`.
pub(crate) async fn wait_for_state(
    states: &mut watch::Receiver<ScanState>,
    wanted: ScanState,
) {
    timeout(WAIT, async {
        while *states.borrow_and_update() != wanted {
            states.changed().await.unwrap();
        }
    })
    .await
    .unwrap();
}
