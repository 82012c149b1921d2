use thiserror::Error;

/// Failures talking to the asset directory.
///
/// These stay transport-shaped; the create binder maps them onto
/// [`ScanError`](crate::error::ScanError) at the orchestration seam.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("directory returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("created entity response carried no usable identifier")]
    MissingIdentifier,

    #[error("directory response body was not understood: {0}")]
    InvalidBody(String),

    #[error("invalid directory endpoint: {0}")]
    InvalidEndpoint(String),
}
