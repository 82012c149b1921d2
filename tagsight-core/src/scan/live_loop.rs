use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tagsight_model::{CaptureConstraints, DecodedPayload, ScanState, SessionId};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{error, info, trace, warn};

use crate::capture::CaptureController;
use crate::decode::{DecodeAttempt, DecodeEngine, EngineError};
use crate::error::{Result, ScanError};
use crate::scan::events::ScanEvent;
use crate::scan::session::ScanSession;

/// Tuning knobs for the live decode loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopTuning {
    /// Pause between frame decode attempts. The loop always yields between
    /// attempts so decode cost never monopolizes the executor.
    pub frame_interval: Duration,
    /// Buffered capacity of the scan event channel. Values below one are
    /// raised to one.
    pub event_capacity: usize,
}

impl Default for LoopTuning {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(200),
            event_capacity: 32,
        }
    }
}

/// Continuously samples frames from an acquired camera stream and attempts
/// decode until a match, a fatal failure, or cancellation.
///
/// Each started scan is an explicit cancellable task: frame results are
/// processed strictly in sampling order, the first non-empty payload wins,
/// and the stream is released before the terminal state becomes observable.
/// Per-frame "no code" outcomes are not errors; the loop keeps sampling.
pub struct LiveDecodeLoop {
    controller: Arc<CaptureController>,
    engine: Arc<dyn DecodeEngine>,
    tuning: LoopTuning,
}

impl LiveDecodeLoop {
    pub fn new(
        controller: Arc<CaptureController>,
        engine: Arc<dyn DecodeEngine>,
    ) -> Self {
        Self {
            controller,
            engine,
            tuning: LoopTuning::default(),
        }
    }

    /// Replace the default tuning.
    pub fn with_tuning(mut self, tuning: LoopTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Spawn a new scan session and hand back its handle.
    pub fn start(&self, constraints: CaptureConstraints) -> ScanHandle {
        let session = ScanSession::new();
        let session_id = session.id();
        let (state_tx, state_rx) = watch::channel(ScanState::Idle);
        // broadcast::channel panics on a zero capacity.
        let (event_tx, _) =
            broadcast::channel(self.tuning.event_capacity.max(1));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_scan(
            Arc::clone(&self.controller),
            Arc::clone(&self.engine),
            constraints,
            self.tuning,
            session,
            ScanChannels {
                states: state_tx,
                events: event_tx.clone(),
            },
            cancel.clone(),
        ));
        info!(target: "scan::loop", session = %session_id, "scan session started");

        ScanHandle {
            session_id,
            cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            task,
            states: state_rx,
            events: event_tx,
        }
    }
}

impl fmt::Debug for LiveDecodeLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveDecodeLoop")
            .field("tuning", &self.tuning)
            .finish_non_exhaustive()
    }
}

/// Handle to a running scan.
///
/// Cancellation is synchronous with respect to resource cleanup:
/// [`ScanHandle::cancel`] waits for the task to finish its teardown, so once
/// it returns the stream is released and the session is terminal; a
/// follow-up acquisition can never race the old stream.
///
/// Dropping the handle without joining also cancels the scan; the task then
/// releases the stream in the background.
pub struct ScanHandle {
    session_id: SessionId,
    cancel: CancellationToken,
    cancel_on_drop: DropGuard,
    task: JoinHandle<ScanSession>,
    states: watch::Receiver<ScanState>,
    events: broadcast::Sender<ScanEvent>,
}

impl ScanHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ScanState {
        *self.states.borrow()
    }

    /// A watch receiver following the session's state transitions.
    pub fn states(&self) -> watch::Receiver<ScanState> {
        self.states.clone()
    }

    /// Subscribe to scan events. Only events sent after subscribing are
    /// delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Whether the scan task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the scan and wait for its teardown to complete.
    pub async fn cancel(self) -> Result<ScanSession> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the scan to finish on its own and take the final session.
    pub async fn join(self) -> Result<ScanSession> {
        // Waiting for a natural finish must not cancel it.
        self.cancel_on_drop.disarm();
        self.task.await.map_err(|err| {
            ScanError::Internal(format!("scan task failed: {err}"))
        })
    }
}

impl fmt::Debug for ScanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanHandle")
            .field("session", &self.session_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

struct ScanChannels {
    states: watch::Sender<ScanState>,
    events: broadcast::Sender<ScanEvent>,
}

impl ScanChannels {
    fn publish(&self, session: &mut ScanSession, next: ScanState) {
        session.set_state(next);
        let _ = self.states.send(next);
        let _ = self.events.send(ScanEvent::StateChanged {
            session: session.id(),
            state: next,
        });
    }
}

async fn run_scan(
    controller: Arc<CaptureController>,
    engine: Arc<dyn DecodeEngine>,
    constraints: CaptureConstraints,
    tuning: LoopTuning,
    mut session: ScanSession,
    channels: ScanChannels,
    cancel: CancellationToken,
) -> ScanSession {
    channels.publish(&mut session, ScanState::PermissionRequested);

    let acquired = tokio::select! {
        _ = cancel.cancelled() => {
            info!(
                target: "scan::loop",
                session = %session.id(),
                "scan cancelled while awaiting the camera"
            );
            channels.publish(&mut session, ScanState::Closed);
            return session;
        }
        acquired = controller.acquire(&constraints) => acquired,
    };

    let mut guard = match acquired {
        Ok(guard) => guard,
        Err(err) => {
            error!(
                target: "scan::loop",
                session = %session.id(),
                error = %err,
                "camera acquisition failed"
            );
            session.record_error(err);
            channels.publish(&mut session, ScanState::Error);
            return session;
        }
    };

    if let Err(err) = controller.bind(&mut guard) {
        error!(
            target: "scan::loop",
            session = %session.id(),
            error = %err,
            "preview binding failed"
        );
        controller.release(&mut guard);
        session.record_error(err);
        channels.publish(&mut session, ScanState::Error);
        return session;
    }
    session.give_stream(guard);
    channels.publish(&mut session, ScanState::Streaming);

    loop {
        if !session.stream_is_live() {
            warn!(
                target: "scan::loop",
                session = %session.id(),
                "stream ended between attempts"
            );
            session.release_stream();
            session.record_error(ScanError::StreamLost(
                "all stream tracks have ended".into(),
            ));
            channels.publish(&mut session, ScanState::Error);
            return session;
        }

        // None means cancellation interrupted the attempt; the in-flight
        // decode is discarded, never awaited further.
        let attempt = match session.stream() {
            Some(stream) => tokio::select! {
                _ = cancel.cancelled() => None,
                attempt = engine.decode_frame(stream) => Some(attempt),
            },
            None => Some(Err(EngineError::StreamEnded(
                "stream handle missing".into(),
            ))),
        };

        let Some(attempt) = attempt else {
            session.release_stream();
            channels.publish(&mut session, ScanState::Closed);
            info!(target: "scan::loop", session = %session.id(), "scan cancelled");
            return session;
        };

        match attempt {
            Ok(DecodeAttempt::Decoded(text)) if !text.is_empty() => {
                // First match wins. Release before publishing so an observer
                // of `Detected` may assume the camera is already off.
                session.release_stream();
                let payload = DecodedPayload::live(text);
                session.record_result(payload.clone());
                channels.publish(&mut session, ScanState::Detected);
                let _ = channels.events.send(ScanEvent::Detected {
                    session: session.id(),
                    payload,
                });
                info!(
                    target: "scan::loop",
                    session = %session.id(),
                    "payload detected; scan complete"
                );
                return session;
            }
            Ok(DecodeAttempt::Decoded(_)) => {
                trace!(
                    target: "scan::loop",
                    session = %session.id(),
                    "empty payload treated as no code"
                );
            }
            Ok(DecodeAttempt::NotFound) => {
                trace!(target: "scan::loop", session = %session.id(), "no code in frame");
            }
            Err(err) if err.is_fatal() => {
                error!(
                    target: "scan::loop",
                    session = %session.id(),
                    error = %err,
                    "stream failed mid-scan"
                );
                session.release_stream();
                session.record_error(ScanError::StreamLost(err.to_string()));
                channels.publish(&mut session, ScanState::Error);
                return session;
            }
            Err(err) => {
                warn!(
                    target: "scan::loop",
                    session = %session.id(),
                    error = %err,
                    "transient decode fault; continuing"
                );
                let _ = channels.events.send(ScanEvent::EngineFault {
                    session: session.id(),
                    message: err.to_string(),
                });
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                session.release_stream();
                channels.publish(&mut session, ScanState::Closed);
                info!(target: "scan::loop", session = %session.id(), "scan cancelled");
                return session;
            }
            _ = tokio::time::sleep(tuning.frame_interval) => {}
        }
    }
}
