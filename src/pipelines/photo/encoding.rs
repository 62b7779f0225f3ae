// SPDX-License-Identifier: GPL-3.0-only

//! Still photo encoding
//!
//! Converts a captured frame to RGB (dropping alpha and row padding) and
//! encodes it as JPEG, the same encoding a browser canvas snapshot uses.

use crate::backends::camera::types::CameraFrame;
use crate::constants::capture::JPEG_QUALITY;
use image::RgbImage;
use tracing::debug;

/// JPEG encoder for captured frames
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl PhotoEncoder {
    /// Create an encoder with the default capture quality
    pub fn new() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }

    /// Create an encoder with a specific JPEG quality (clamped to 1-100)
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a frame as JPEG
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - JPEG bytes
    /// * `Err(String)` - Frame incomplete or encoder failure
    pub fn encode_jpeg(&self, frame: &CameraFrame) -> Result<Vec<u8>, String> {
        let image = frame_to_rgb(frame)?;

        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, self.quality);

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| format!("JPEG encoding failed: {}", e))?;

        debug!(
            width = image.width(),
            height = image.height(),
            size = buffer.len(),
            "Frame encoded"
        );
        Ok(buffer)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an RGBA or RGB frame to a packed RGB image
fn frame_to_rgb(frame: &CameraFrame) -> Result<RgbImage, String> {
    if !frame.is_complete() {
        return Err(format!(
            "Frame data too small: {}x{} with stride {} needs more than {} bytes",
            frame.width,
            frame.height,
            frame.stride,
            frame.data.len()
        ));
    }

    let bpp = frame.format.bytes_per_pixel() as usize;
    let width = frame.width as usize;
    let height = frame.height as usize;
    let row_bytes = width * bpp;

    let mut rgb = Vec::with_capacity(width * height * 3);
    for row in frame.data.chunks(frame.stride as usize).take(height) {
        for pixel in row[..row_bytes].chunks_exact(bpp) {
            rgb.extend_from_slice(&pixel[..3]);
        }
    }

    RgbImage::from_raw(frame.width, frame.height, rgb)
        .ok_or_else(|| "Failed to create RGB image from converted data".to_string())
}
