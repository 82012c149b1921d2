use chrono::{DateTime, Utc};
use tagsight_model::{DecodedPayload, ScanState, SessionId};
use tracing::debug;

use crate::capture::StreamGuard;
use crate::error::ScanError;

/// One live-scan attempt.
///
/// The session exclusively owns its camera stream while one is held, records
/// the decoded result or tagged error it ended with, and is mutated only by
/// the live decode loop driving it. Observers follow the session through the
/// loop's state channel; the session value itself is handed back when the
/// task finishes.
#[derive(Debug)]
pub struct ScanSession {
    id: SessionId,
    state: ScanState,
    stream: Option<StreamGuard>,
    result: Option<DecodedPayload>,
    error: Option<ScanError>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl ScanSession {
    pub(crate) fn new() -> Self {
        Self {
            id: SessionId::new(),
            state: ScanState::Idle,
            stream: None,
            result: None,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// The decoded payload, once the session reached `Detected`.
    pub fn result(&self) -> Option<&DecodedPayload> {
        self.result.as_ref()
    }

    /// The error the session ended with, once it reached `Error`.
    pub fn error(&self) -> Option<&ScanError> {
        self.error.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Whether the session still holds an unreleased stream.
    pub fn holds_stream(&self) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|guard| !guard.is_released())
    }

    pub(crate) fn set_state(&mut self, next: ScanState) {
        debug!(
            target: "scan::loop",
            session = %self.id,
            from = %self.state,
            to = %next,
            "scan state transition"
        );
        self.state = next;
        if next.is_terminal() && self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    pub(crate) fn give_stream(&mut self, guard: StreamGuard) {
        self.stream = Some(guard);
    }

    pub(crate) fn stream(&self) -> Option<&crate::capture::MediaStream> {
        self.stream.as_ref().map(StreamGuard::stream)
    }

    pub(crate) fn stream_is_live(&self) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|guard| guard.stream().is_live())
    }

    /// Release the held stream. Releasing twice is a no-op, so every exit
    /// path can call this unconditionally.
    pub(crate) fn release_stream(&mut self) {
        if let Some(guard) = self.stream.as_mut() {
            guard.release();
        }
    }

    pub(crate) fn record_result(&mut self, payload: DecodedPayload) {
        self.result = Some(payload);
    }

    pub(crate) fn record_error(&mut self, error: ScanError) {
        self.error = Some(error);
    }
}
