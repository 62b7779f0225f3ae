// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Fixed operator identifier used when the config does not override it
pub const DEFAULT_OPERATOR_ID: &str = "OP-7749";

/// Record persistence constants
pub mod records {
    /// Key under which the whole ordered record sequence is stored
    pub const STORAGE_KEY: &str = "dept_transmutation_records";

    /// Key an unreadable record payload is moved to before it can be overwritten
    pub const CORRUPT_KEY: &str = "dept_transmutation_records.corrupt";

    /// Default capacity of the durable medium (mirrors a browser storage quota)
    pub const DEFAULT_CAPACITY_BYTES: u64 = 5 * 1024 * 1024;

    /// Prefix of generated record identifiers
    pub const ID_PREFIX: &str = "dt_entity_";
}

/// Case number constants
pub mod case_numbers {
    /// Prefix of every case number
    pub const PREFIX: &str = "DT";

    /// Minimum width of the zero-padded sequence component
    pub const SEQUENCE_WIDTH: usize = 4;

    /// Prefix of the fallback entity name for blank labels
    pub const ENTITY_NAME_PREFIX: &str = "Entity";
}

/// Upload constants
pub mod upload {
    /// Key prefix under which source documents are stored
    pub const KEY_PREFIX: &str = "dept-transmutation/documents";

    /// Number of hex characters of randomness mixed into each upload key
    pub const KEY_ENTROPY_CHARS: usize = 8;
}

/// Transformation directive sent with every transform request
pub mod transform {
    /// Prompt describing the rendering to produce
    pub const PROMPT: &str = "Transform this children's drawing into a highly detailed, \
official government-classified 3D entity. Create a professional, technical rendering \
suitable for official documentation. The entity should appear as a legitimate classified \
specimen with proper lighting, shadows, and a neutral background. Make it look like an \
official government photograph of a contained anomalous entity.";

    /// Output resolution
    pub const SIZE: &str = "1024x1024";

    /// Output quality tier
    pub const QUALITY: &str = "high";

    /// Number of output images requested
    pub const OUTPUT_COUNT: u32 = 1;
}

/// Camera capture constants
pub mod capture {
    /// JPEG quality for captured stills (0-100)
    pub const JPEG_QUALITY: u8 = 80;

    /// Prefix of the file name given to captured stills
    pub const FILE_NAME_PREFIX: &str = "dept-document";

    /// MIME type of captured stills
    pub const CONTENT_TYPE: &str = "image/jpeg";
}

/// Supported file formats for the file-source camera and uploads
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Timing constants for external calls
pub mod timing {
    use super::Duration;

    /// Upload timeout
    pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

    /// Transform timeout (image generation is slow)
    pub const TRANSFORM_TIMEOUT: Duration = Duration::from_secs(180);

    /// Download timeout for exported entity images
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
}

/// Progress phrases reported at each pipeline stage boundary
pub mod progress {
    pub const RECEIVED: &str = "DOCUMENT RECEIVED - INITIATING SCAN PROTOCOLS";
    pub const UPLOADING: &str = "UPLOADING TO SECURE SERVERS";
    pub const ANALYZING: &str = "ANALYZING DIMENSIONAL PROPERTIES";
    pub const TRANSFORMING: &str = "INITIATING TRANSMUTATION SEQUENCE";
    pub const FINALIZING: &str = "FINALIZING CLASSIFICATION PROTOCOLS";
    pub const COMPLETE: &str = "TRANSMUTATION COMPLETE - ENTITY CLASSIFIED";
    pub const FAILED: &str = "ERROR - TRANSMUTATION FAILED";
}

/// Share/export constants
pub mod export {
    /// Suffix of the share title
    pub const SHARE_TITLE_SUFFIX: &str = "Department of Transmutation";

    /// Extension of downloaded entity images
    pub const DOWNLOAD_EXTENSION: &str = "png";

    /// Subdirectory of the pictures directory used for downloads
    pub const DOWNLOAD_SUBDIR: &str = "transmutation";
}
