// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │   CaptureSession    │  ← Scoped acquisition, guaranteed release
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!     ┌────────────┐
//!     │ FileSource │  ← Still image served as a live surface
//!     └────────────┘
//! ```

pub mod file_source;
pub mod types;

pub use file_source::FileSourceBackend;
pub use types::*;

/// Device capture surface
///
/// A backend owns one exclusive hardware (or virtual) device. It is driven
/// by [`crate::capture::CaptureSession`], which guarantees that
/// [`CameraBackend::shutdown`] runs once for every successful
/// [`CameraBackend::initialize`].
pub trait CameraBackend: Send {
    /// Acquire the device and start the live surface
    ///
    /// # Returns
    /// * `Ok(())` - Device acquired
    /// * `Err(BackendError::Busy)` - Device already acquired
    /// * `Err(BackendError)` - Device missing or denied
    fn initialize(&mut self) -> BackendResult<()>;

    /// Take a still frame from the live surface
    ///
    /// Returns `Ok(None)` when the surface has not produced data yet.
    fn capture_frame(&mut self) -> BackendResult<Option<CameraFrame>>;

    /// Stop the surface and release the device
    fn shutdown(&mut self) -> BackendResult<()>;

    /// Check if the device is currently held
    fn is_initialized(&self) -> bool;

    /// Human-readable device name
    fn name(&self) -> &str;
}
