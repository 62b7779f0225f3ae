// SPDX-License-Identifier: GPL-3.0-only

//! File source camera
//!
//! Serves a still image file as a live camera surface. The file is decoded
//! when the device is acquired, so a missing or unreadable file surfaces as
//! an unavailable device rather than a failed capture.

use super::CameraBackend;
use super::types::{BackendError, BackendResult, CameraFrame, PixelFormat};
use crate::constants::file_formats;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Virtual camera backed by an image file
pub struct FileSourceBackend {
    path: PathBuf,
    name: String,
    frame: Option<CameraFrame>,
}

impl FileSourceBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| format!("File source ({})", n.to_string_lossy()))
            .unwrap_or_else(|| "File source".to_string());
        Self {
            path,
            name,
            frame: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CameraBackend for FileSourceBackend {
    fn initialize(&mut self) -> BackendResult<()> {
        if self.frame.is_some() {
            return Err(BackendError::Busy);
        }

        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !file_formats::is_image_extension(extension) {
            return Err(BackendError::NotAvailable(format!(
                "Unsupported file format: {}",
                extension
            )));
        }
        if !self.path.exists() {
            return Err(BackendError::DeviceNotFound(
                self.path.display().to_string(),
            ));
        }

        self.frame = Some(load_image_as_frame(&self.path)?);
        info!(device = %self.name, "File source initialized");
        Ok(())
    }

    fn capture_frame(&mut self) -> BackendResult<Option<CameraFrame>> {
        let frame = self.frame.as_ref().ok_or(BackendError::NotInitialized)?;
        let mut frame = frame.clone();
        frame.captured_at = Instant::now();
        Ok(Some(frame))
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        if self.frame.take().is_some() {
            debug!(device = %self.name, "File source released");
        }
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.frame.is_some()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Load an image file as an RGBA frame
pub fn load_image_as_frame(path: &Path) -> BackendResult<CameraFrame> {
    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        BackendError::InitializationFailed(format!(
            "Failed to load image '{}': {}",
            path.display(),
            e
        ))
    })?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();
    let data: Vec<u8> = rgba.into_raw();

    debug!(width, height, "Image loaded successfully");

    Ok(CameraFrame {
        data: Arc::from(data.into_boxed_slice()),
        width,
        height,
        stride: width * 4,
        format: PixelFormat::RGBA,
        captured_at: Instant::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path) -> PathBuf {
        let path = dir.join("drawing.png");
        image::RgbaImage::from_pixel(8, 6, image::Rgba([200, 10, 10, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_capture_requires_initialize() {
        let mut backend = FileSourceBackend::new("/nonexistent/drawing.png");
        assert_eq!(
            backend.capture_frame().unwrap_err(),
            BackendError::NotInitialized
        );
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let mut backend = FileSourceBackend::new("/nonexistent/drawing.png");
        assert!(matches!(
            backend.initialize(),
            Err(BackendError::DeviceNotFound(_))
        ));
        assert!(!backend.is_initialized());
    }

    #[test]
    fn test_unsupported_extension() {
        let mut backend = FileSourceBackend::new("/tmp/notes.txt");
        assert!(matches!(
            backend.initialize(),
            Err(BackendError::NotAvailable(_))
        ));
    }

    #[test]
    fn test_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileSourceBackend::new(write_png(dir.path()));

        backend.initialize().unwrap();
        assert!(backend.is_initialized());
        assert_eq!(backend.initialize(), Err(BackendError::Busy));

        let frame = backend.capture_frame().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (8, 6));
        assert_eq!(frame.data.len(), 8 * 6 * 4);

        backend.shutdown().unwrap();
        assert!(!backend.is_initialized());
        backend.shutdown().unwrap();
    }
}
