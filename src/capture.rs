// SPDX-License-Identifier: GPL-3.0-only

//! Camera capture sessions
//!
//! A [`CaptureSession`] holds a camera device for as long as it lives and
//! turns still frames into [`ImageUpload`]s that look exactly like a file
//! the operator picked by hand. The device is released on [`close`], on
//! drop, or on whichever comes first, and never twice.
//!
//! [`close`]: CaptureSession::close

use crate::backends::camera::CameraBackend;
use crate::backends::camera::types::BackendError;
use crate::constants::capture::{CONTENT_TYPE, FILE_NAME_PREFIX};
use crate::errors::{CaptureError, CaptureResult};
use crate::pipelines::photo::PhotoEncoder;
use crate::pipelines::transmutation::ImageUpload;
use tracing::{debug, info, warn};

/// Exclusive, scoped hold on a camera device
///
/// The session borrows its backend mutably, so a second session on the same
/// device cannot be opened while this one is alive.
pub struct CaptureSession<'a, B: CameraBackend + ?Sized> {
    backend: &'a mut B,
    encoder: PhotoEncoder,
    released: bool,
}

impl<'a, B: CameraBackend + ?Sized> CaptureSession<'a, B> {
    /// Acquire the device
    ///
    /// Fails with [`CaptureError::DeviceUnavailable`] when the backend cannot
    /// be initialized. Nothing needs releasing in that case.
    pub fn open(backend: &'a mut B, encoder: PhotoEncoder) -> CaptureResult<Self> {
        backend.initialize().map_err(|e| {
            warn!(device = %backend.name(), error = %e, "Failed to start camera");
            CaptureError::DeviceUnavailable(e.to_string())
        })?;

        info!(device = %backend.name(), "Capture session opened");
        Ok(Self {
            backend,
            encoder,
            released: false,
        })
    }

    /// Whether the device is still held by this session
    pub fn is_open(&self) -> bool {
        !self.released
    }

    /// Snapshot the live surface and encode it as a JPEG upload
    ///
    /// Fails with [`CaptureError::CaptureFailed`] if the surface has no data
    /// yet or the frame cannot be encoded. The session stays open either way.
    pub fn capture_frame(&mut self) -> CaptureResult<ImageUpload> {
        if self.released {
            return Err(CaptureError::CaptureFailed(
                "capture session is closed".to_string(),
            ));
        }

        let frame = match self.backend.capture_frame() {
            Ok(Some(frame)) if !frame.is_empty() => frame,
            Ok(_) => {
                return Err(CaptureError::CaptureFailed(
                    "camera has not produced a frame yet".to_string(),
                ));
            }
            Err(BackendError::NotInitialized) => {
                return Err(CaptureError::CaptureFailed(
                    "camera stopped unexpectedly".to_string(),
                ));
            }
            Err(e) => return Err(CaptureError::CaptureFailed(e.to_string())),
        };

        debug!(
            width = frame.width,
            height = frame.height,
            format = ?frame.format,
            "Frame captured"
        );

        let bytes = self
            .encoder
            .encode_jpeg(&frame)
            .map_err(CaptureError::CaptureFailed)?;
        let file_name = format!(
            "{}-{}.jpg",
            FILE_NAME_PREFIX,
            chrono::Utc::now().timestamp_millis()
        );

        Ok(ImageUpload::new(bytes, file_name, CONTENT_TYPE))
    }

    /// Release the device; further calls do nothing
    pub fn close(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.backend.shutdown() {
            Ok(()) => info!(device = %self.backend.name(), "Capture session closed"),
            Err(e) => warn!(device = %self.backend.name(), error = %e, "Error releasing camera"),
        }
    }
}

impl<B: CameraBackend + ?Sized> Drop for CaptureSession<'_, B> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open a session, take one still, and release the device
pub fn capture_still<B: CameraBackend + ?Sized>(
    backend: &mut B,
    encoder: PhotoEncoder,
) -> CaptureResult<ImageUpload> {
    let mut session = CaptureSession::open(backend, encoder)?;
    let upload = session.capture_frame();
    session.close();
    upload
}
