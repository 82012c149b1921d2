use async_trait::async_trait;
use tagsight_model::PixelBuffer;
use thiserror::Error;

use crate::capture::MediaStream;

/// Outcome of one decode attempt. "No code present" is a normal outcome,
/// not an error: the live loop keeps sampling and the still decoder simply
/// reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAttempt {
    /// A code was found; this is its raw text payload.
    Decoded(String),
    /// The input was readable but contained no code.
    NotFound,
}

/// Failures raised by a decode engine, classified by what the caller should
/// do about them.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Per-frame hiccup; the live loop reports it and keeps sampling.
    #[error("transient decode fault: {0}")]
    Transient(String),

    /// The input data itself is unreadable. Aborts a still attempt; on a
    /// live frame it is treated like a transient fault.
    #[error("unreadable image data: {0}")]
    Unreadable(String),

    /// The stream the engine was sampling has ended. Fatal to the scan.
    #[error("stream ended: {0}")]
    StreamEnded(String),
}

impl EngineError {
    /// Whether this failure ends the owning scan rather than one attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::StreamEnded(_))
    }
}

/// Decode-engine port: the external library that actually finds and decodes
/// visual codes. Two entry points mirror the two capture paths.
#[async_trait]
pub trait DecodeEngine: Send + Sync {
    /// One decode attempt against the most recent frame of a live stream.
    /// Invoked once per sampled frame by the live loop.
    async fn decode_frame(
        &self,
        stream: &MediaStream,
    ) -> std::result::Result<DecodeAttempt, EngineError>;

    /// One decode attempt against a raster buffer at its native dimensions.
    async fn decode_pixels(
        &self,
        buffer: &PixelBuffer,
    ) -> std::result::Result<DecodeAttempt, EngineError>;
}
