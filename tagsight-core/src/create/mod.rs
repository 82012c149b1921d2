//! Two-phase asset creation.
//!
//! Phase 1 submits the entity fields; phase 2 uploads the captured image
//! keyed by the identifier phase 1 minted. The two remote writes are
//! independent, so a failed attachment leaves a real entity behind; that
//! partial success is reported as such, never as a rollback.

mod binder;
mod draft;

pub use binder::{CreateBinder, CreationResult, Phase};
pub use draft::{CreationDraft, EntityFields};
