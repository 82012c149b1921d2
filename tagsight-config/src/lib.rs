//! Shared configuration library for tagsight.
//!
//! This crate centralizes console config loading and validation so embedders
//! and tooling share a single source of truth for defaults: the remote asset
//! directory endpoints, default camera constraints, and live-loop tuning.
//! Configuration is read from an env-pointed file, inline env JSON, or a
//! default file, in that order, falling back to built-in defaults.

pub mod models;

pub use models::console::{
    CaptureSettings, ConsoleConfig, ConsoleConfigSource, RemoteConfig,
    ScanSettings,
};
