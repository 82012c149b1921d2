use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tagsight_model::{DecodedPayload, PixelBuffer};
use tracing::debug;

use crate::decode::engine::{DecodeAttempt, DecodeEngine};
use crate::error::{Result, ScanError};

/// What a still-image decode produced.
///
/// `NotFound` means the image was perfectly readable and simply contained no
/// code, unlike [`ScanError::DecodeFailed`], which means the input could not
/// be read at all. The two are never conflated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StillOutcome {
    /// A code was decoded; the payload is tagged `static-image`.
    Decoded(DecodedPayload),
    /// The image holds no code.
    NotFound,
}

/// Decodes a visual code from a single uploaded image.
///
/// A still image yields at most one chance, so this rasterizes at native
/// dimensions and runs exactly one engine attempt: no loop, no camera.
pub struct StillDecoder {
    engine: Arc<dyn DecodeEngine>,
}

impl StillDecoder {
    pub fn new(engine: Arc<dyn DecodeEngine>) -> Self {
        Self { engine }
    }

    /// Decode from the raw bytes of an encoded image (PNG, JPEG, ...).
    pub async fn decode_bytes(&self, bytes: &[u8]) -> Result<StillOutcome> {
        let decoded = image::load_from_memory(bytes).map_err(|err| {
            ScanError::DecodeFailed(format!("unreadable image: {err}"))
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let buffer = PixelBuffer::rgba8(width, height, rgba.into_raw());
        debug!(
            target: "decode",
            width,
            height,
            "rasterized still image for decode"
        );

        match self.engine.decode_pixels(&buffer).await {
            Ok(DecodeAttempt::Decoded(text)) if !text.is_empty() => Ok(
                StillOutcome::Decoded(DecodedPayload::static_image(text)),
            ),
            Ok(_) => Ok(StillOutcome::NotFound),
            Err(err) => Err(ScanError::DecodeFailed(err.to_string())),
        }
    }

    /// Decode from a `data:<mime>;base64,<payload>` URL, the form browser
    /// file inputs hand over.
    pub async fn decode_data_url(&self, url: &str) -> Result<StillOutcome> {
        let bytes = data_url_bytes(url)?;
        self.decode_bytes(&bytes).await
    }
}

impl std::fmt::Debug for StillDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StillDecoder").finish_non_exhaustive()
    }
}

fn data_url_bytes(url: &str) -> Result<Vec<u8>> {
    let rest = url.strip_prefix("data:").ok_or_else(|| {
        ScanError::DecodeFailed("not a data URL".into())
    })?;
    let (_, encoded) = rest.split_once(";base64,").ok_or_else(|| {
        ScanError::DecodeFailed("data URL is missing a base64 payload".into())
    })?;
    BASE64.decode(encoded.trim()).map_err(|err| {
        ScanError::DecodeFailed(format!("invalid base64 payload: {err}"))
    })
}
