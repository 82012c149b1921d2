//! Camera stream acquisition and scoped release.
//!
//! The camera is an exclusive platform resource. [`CaptureController`]
//! acquires it through the [`CameraDevice`] port, binds it to a
//! [`PreviewSurface`], and hands ownership to a [`StreamGuard`] whose drop
//! releases every track, so no code path can leave the camera on.

mod controller;
mod device;
mod stream;
mod surface;

pub use controller::{CaptureController, StreamGuard};
pub use device::CameraDevice;
pub use stream::{MediaStream, MediaTrack};
pub use surface::{HeadlessSurface, PreviewSurface};
