/// Lifecycle of one live-scan session.
///
/// `Detected`, `Error` and `Closed` are terminal; a session never leaves a
/// terminal state. `Closed` is reachable from any non-terminal state through
/// user cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ScanState {
    /// Session exists but nothing has been requested yet.
    Idle,
    /// Camera acquisition is in flight, waiting on the permission prompt.
    PermissionRequested,
    /// Stream bound to the preview surface; frames are being sampled.
    Streaming,
    /// A payload was decoded; the stream has already been released.
    Detected,
    /// Terminal failure; the session's error field says which kind.
    Error,
    /// User cancelled; the stream, if any, has been released.
    Closed,
}

impl ScanState {
    /// Whether the session has finished, successfully or otherwise.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanState::Detected | ScanState::Error | ScanState::Closed
        )
    }

    /// Whether the session may still hold or acquire a camera stream.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScanState::Idle => "idle",
            ScanState::PermissionRequested => "permission_requested",
            ScanState::Streaming => "streaming",
            ScanState::Detected => "detected",
            ScanState::Error => "error",
            ScanState::Closed => "closed",
        };
        f.write_str(name)
    }
}
