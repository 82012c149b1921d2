use tagsight_model::AssetId;
use thiserror::Error;

/// Errors surfaced by the capture and resolution subsystem.
///
/// Two taxonomy members are deliberately not here because they are not
/// errors: a per-frame "no code visible" outcome is
/// [`DecodeAttempt::NotFound`](crate::decode::DecodeAttempt), and a resolver
/// miss is a plain `None`. The subsystem never retries on its own; every
/// variant is reported once and retry is a fresh user action.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Camera access refused by the user or platform. Recoverable by retry.
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    /// No usable camera device. Recoverable by retry or by falling back to
    /// still-image decode.
    #[error("Camera device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Acquisition attempted while another stream is still held.
    #[error("Scanner busy: {0}")]
    ScannerBusy(String),

    /// The live stream died mid-scan (track ended, device unplugged).
    #[error("Camera stream lost: {0}")]
    StreamLost(String),

    /// Malformed or unreadable image input; the decode attempt was aborted.
    #[error("Image could not be decoded: {0}")]
    DecodeFailed(String),

    /// A creation draft is missing required fields or its image artifact.
    #[error("Draft incomplete: {0}")]
    DraftIncomplete(String),

    /// A creation draft was already submitted, or is in flight right now.
    #[error("Draft already submitted: {0}")]
    DraftAlreadySubmitted(String),

    /// Phase 1 of the creation protocol failed; nothing usable was persisted.
    #[error("Entity creation failed: {0}")]
    CreateFailed(String),

    /// Phase 2 failed after a successful phase 1: the entity identified by
    /// `id` exists but its artifact is missing. A partial success, not a
    /// plain failure.
    #[error("Artifact attachment failed for entity {id}: {reason}")]
    AttachFailed {
        /// Identifier the creation endpoint handed back in phase 1.
        id: AssetId,
        /// Why the attachment call failed.
        reason: String,
    },

    /// Invariant breach inside the subsystem (channel closed, task failure).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience result type alias
pub type Result<T> = std::result::Result<T, ScanError>;
