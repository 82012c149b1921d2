use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tagsight_model::StreamId;

struct TrackShared {
    label: String,
    live: AtomicBool,
}

/// One constituent track of a camera stream.
///
/// Tracks are cheap handles over shared state, so a caller that kept a clone
/// can observe `is_live` flipping after the owning stream is released.
/// Stopping is one-way; a stopped track never comes back.
#[derive(Clone)]
pub struct MediaTrack {
    shared: Arc<TrackShared>,
}

impl MediaTrack {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(TrackShared {
                label: label.into(),
                live: AtomicBool::new(true),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.shared.label
    }

    pub fn is_live(&self) -> bool {
        self.shared.live.load(Ordering::Acquire)
    }

    /// Stop the track. Idempotent.
    pub fn stop(&self) {
        self.shared.live.store(false, Ordering::Release);
    }
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("label", &self.shared.label)
            .field("live", &self.is_live())
            .finish()
    }
}

/// An acquired camera stream: an exclusive handle over its tracks.
///
/// Deliberately not `Clone`: exactly one owner may hold (and eventually
/// release) a given stream.
#[derive(Debug)]
pub struct MediaStream {
    id: StreamId,
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    /// Wrap the tracks a camera device handed back.
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: StreamId::new(),
            tracks,
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// A stream is live while any of its tracks still is.
    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }

    pub(crate) fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}
