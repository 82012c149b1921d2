use std::fmt;

use tagsight_model::{CaptureConstraints, ScanState, SessionId};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::scan::events::ScanEvent;
use crate::scan::live_loop::{LiveDecodeLoop, ScanHandle};
use crate::scan::session::ScanSession;

/// Owns the single active scan.
///
/// Starting a new scan supersedes the previous one: the old session is
/// cancelled and fully torn down before the replacement is spawned, so two
/// sessions never hold camera streams at the same time.
pub struct ScanSupervisor {
    runner: LiveDecodeLoop,
    active: Mutex<Option<ScanHandle>>,
}

/// What a caller gets back from [`ScanSupervisor::begin_scan`]: the session
/// id plus receivers for its state transitions and events.
pub struct ScanTicket {
    pub session_id: SessionId,
    pub states: watch::Receiver<ScanState>,
    pub events: broadcast::Receiver<ScanEvent>,
}

impl fmt::Debug for ScanTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanTicket")
            .field("session", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl ScanSupervisor {
    pub fn new(runner: LiveDecodeLoop) -> Self {
        Self {
            runner,
            active: Mutex::new(None),
        }
    }

    /// Start a scan, cancelling and awaiting any scan already running.
    ///
    /// Acquisition failures do not surface here; they arrive through the
    /// ticket's state channel as [`ScanState::Error`].
    pub async fn begin_scan(&self, constraints: CaptureConstraints) -> ScanTicket {
        let mut active = self.active.lock().await;
        if let Some(prior) = active.take() {
            let prior_id = prior.session_id();
            match prior.cancel().await {
                Ok(session) => debug!(
                    target: "scan::supervisor",
                    session = %prior_id,
                    state = %session.state(),
                    "superseded previous scan"
                ),
                Err(err) => warn!(
                    target: "scan::supervisor",
                    session = %prior_id,
                    error = %err,
                    "previous scan ended abnormally"
                ),
            }
        }

        let handle = self.runner.start(constraints);
        let ticket = ScanTicket {
            session_id: handle.session_id(),
            states: handle.states(),
            events: handle.subscribe(),
        };
        info!(target: "scan::supervisor", session = %ticket.session_id, "scan activated");
        *active = Some(handle);
        ticket
    }

    /// Cancel the active scan, if any, and wait for its teardown.
    pub async fn cancel_active(&self) -> Result<Option<ScanSession>> {
        let mut active = self.active.lock().await;
        match active.take() {
            Some(handle) => handle.cancel().await.map(Some),
            None => Ok(None),
        }
    }

    /// Wait for the active scan to finish on its own and take its session.
    pub async fn finish_active(&self) -> Result<Option<ScanSession>> {
        let mut active = self.active.lock().await;
        match active.take() {
            Some(handle) => handle.join().await.map(Some),
            None => Ok(None),
        }
    }

    /// State of the active scan, or `None` when nothing is running.
    pub async fn active_state(&self) -> Option<ScanState> {
        self.active.lock().await.as_ref().map(ScanHandle::state)
    }
}

impl fmt::Debug for ScanSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSupervisor")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}
