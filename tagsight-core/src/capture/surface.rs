use tagsight_model::StreamId;

use crate::capture::stream::MediaStream;
use crate::error::Result;

/// Rendering-surface port: where the live preview goes while scanning.
/// Attach/detach are synchronous; the surface only borrows the stream.
pub trait PreviewSurface: Send + Sync {
    /// Show the stream on the surface.
    fn attach(&self, stream: &MediaStream) -> Result<()>;

    /// Take the stream off the surface. Called during release; must not fail.
    fn detach(&self, stream: StreamId);
}

/// Surface that renders nothing. For headless embeddings and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessSurface;

impl PreviewSurface for HeadlessSurface {
    fn attach(&self, _stream: &MediaStream) -> Result<()> {
        Ok(())
    }

    fn detach(&self, _stream: StreamId) {}
}
