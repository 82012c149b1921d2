//! # Tagsight Core
//!
//! Core library for the tagsight inventory console, providing camera stream
//! capture, visual code decoding, catalog resolution, and two-phase asset
//! creation.
//!
//! ## Overview
//!
//! - **Capture**: scoped camera acquisition with guard-based, idempotent
//!   stream release
//! - **Decoding**: a continuous, cancellable live decode loop plus a
//!   single-attempt still-image decoder
//! - **Resolution**: exact payload-to-catalog matching, first entity in
//!   catalog order wins
//! - **Creation**: the two-phase create protocol with partial success as a
//!   first-class outcome
//! - **Remote**: the asset directory port and its HTTP binding
//!
//! The seams are injected collaborators: camera access
//! ([`capture::CameraDevice`]), the decode engine ([`decode::DecodeEngine`]),
//! and the asset directory ([`remote::EntityDirectory`]). Everything is
//! written against current-thread tokio semantics; futures stay `Send` so
//! embedders may run a multi-threaded runtime instead.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tagsight_core::capture::{CaptureController, HeadlessSurface};
//! use tagsight_core::resolve;
//! use tagsight_core::scan::{LiveDecodeLoop, ScanSupervisor};
//! use tagsight_model::CaptureConstraints;
//!
//! async fn scan_to_find(
//!     camera: Arc<dyn tagsight_core::capture::CameraDevice>,
//!     engine: Arc<dyn tagsight_core::decode::DecodeEngine>,
//!     directory: Arc<dyn tagsight_core::remote::EntityDirectory>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let controller =
//!         Arc::new(CaptureController::new(camera, Arc::new(HeadlessSurface)));
//!     let supervisor = ScanSupervisor::new(LiveDecodeLoop::new(controller, engine));
//!
//!     let _ticket = supervisor.begin_scan(CaptureConstraints::default()).await;
//!     if let Some(session) = supervisor.finish_active().await?
//!         && let Some(payload) = session.result()
//!     {
//!         let catalog = directory.fetch_catalog().await?;
//!         match resolve::resolve_payload(payload, &catalog) {
//!             Some(entity) => println!("scanned payload belongs to {}", entity.id),
//!             None => println!("no catalog entity carries this code"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

/// Camera stream acquisition and release guards
pub mod capture;

/// Creation drafts and the two-phase create binder
pub mod create;

/// Decode engine port and the single-shot still decoder
pub mod decode;

/// Error types shared across the crate
pub mod error;

/// Asset directory port and its HTTP binding
pub mod remote;

/// Payload-to-catalog resolution
pub mod resolve;

/// Live scan sessions, their events, and the supervisor
pub mod scan;

pub use error::{Result, ScanError};
