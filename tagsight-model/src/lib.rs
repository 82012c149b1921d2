//! Core data model definitions shared across tagsight crates.
#![allow(missing_docs)]

pub mod capture;
pub mod catalog;
pub mod ids;
pub mod payload;
pub mod state;

// Intentionally curated re-exports for downstream consumers.
pub use capture::{CaptureConstraints, FacingMode, ImageArtifact, PixelBuffer};
pub use catalog::{CatalogEntity, TagField};
pub use ids::{AssetId, DraftId, SessionId, StreamId};
pub use payload::{DecodedPayload, PayloadSource};
pub use state::ScanState;
