// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline input
//!
//! Both file uploads and camera captures end up as an [`ImageUpload`]: raw
//! encoded bytes plus the file name and MIME type a browser would attach.

use crate::errors::PipelineError;
use chrono::{DateTime, Utc};
use image::ImageFormat;
use std::path::Path;
use uuid::Uuid;

/// Encoded image bytes with file metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    bytes: Vec<u8>,
    file_name: String,
    content_type: String,
}

impl ImageUpload {
    pub fn new(
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Read an image file, deriving the MIME type from its extension
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let content_type = ImageFormat::from_path(path)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");

        Ok(Self::new(bytes, file_name, content_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Check that the bytes hold an image the transform service can read
    pub fn validate(&self) -> Result<ImageFormat, PipelineError> {
        if self.bytes.is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "{} is empty",
                self.file_name
            )));
        }
        image::guess_format(&self.bytes).map_err(|_| {
            PipelineError::InvalidInput(format!("{} is not a recognized image", self.file_name))
        })
    }
}

/// Build a collision-resistant storage key for an upload
///
/// `<prefix>/<unix-millis>-<random hex>-<sanitized file name>`
pub fn upload_key(
    prefix: &str,
    file_name: &str,
    now: DateTime<Utc>,
    entropy_chars: usize,
) -> String {
    let entropy = Uuid::new_v4().simple().to_string();
    let entropy = &entropy[..entropy_chars.min(entropy.len())];
    format!(
        "{}/{}-{}-{}",
        prefix.trim_end_matches('/'),
        now.timestamp_millis(),
        entropy,
        sanitize_file_name(file_name)
    )
}

/// Keep the last path segment and replace anything unsafe in a key
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut buffer = Vec::new();
        image::RgbImage::new(2, 2)
            .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_validate() {
        let ok = ImageUpload::new(png_bytes(), "a.png", "image/png");
        assert_eq!(ok.validate().unwrap(), ImageFormat::Png);

        let empty = ImageUpload::new(Vec::new(), "a.png", "image/png");
        assert!(matches!(empty.validate(), Err(PipelineError::InvalidInput(_))));

        let text = ImageUpload::new(b"hello world".to_vec(), "a.txt", "text/plain");
        assert!(matches!(text.validate(), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_upload_key_shape() {
        let now = Utc::now();
        let key = upload_key("dept-transmutation/documents/", "my drawing.png", now, 8);
        let expected_prefix = format!("dept-transmutation/documents/{}-", now.timestamp_millis());
        assert!(key.starts_with(&expected_prefix));
        assert!(key.ends_with("-my_drawing.png"));

        let entropy = &key[expected_prefix.len()..expected_prefix.len() + 8];
        assert!(entropy.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_upload_keys_differ_for_same_instant() {
        let now = Utc::now();
        assert_ne!(
            upload_key("p", "a.jpg", now, 8),
            upload_key("p", "a.jpg", now, 8)
        );
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\scan 1.jpg"), "scan_1.jpg");
        assert_eq!(sanitize_file_name(""), "document");
        assert_eq!(sanitize_file_name(".."), "document");
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name(), "scan.png");
        assert_eq!(upload.content_type(), "image/png");
        assert!(upload.validate().is_ok());
    }
}
