use tagsight_model::{DecodedPayload, ScanState, SessionId};

/// Events published by a running scan for UI consumption.
///
/// Terminal detail (the payload, the error) also lands on the returned
/// [`ScanSession`](crate::scan::ScanSession); events exist so a UI can react
/// to transitions without polling.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// The session moved to a new lifecycle state.
    StateChanged {
        /// Session the transition belongs to.
        session: SessionId,
        /// The state entered.
        state: ScanState,
    },
    /// First (and only) successful decode of the session.
    Detected {
        /// Session that decoded the payload.
        session: SessionId,
        /// The decoded payload, tagged `live`.
        payload: DecodedPayload,
    },
    /// A per-frame engine fault that did not stop the loop.
    EngineFault {
        /// Session that observed the fault.
        session: SessionId,
        /// Human-readable description of the fault.
        message: String,
    },
}
