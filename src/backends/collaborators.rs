// SPDX-License-Identifier: GPL-3.0-only

//! External storage and transform collaborators
//!
//! The pipeline depends only on the two traits below. The HTTP clients are
//! the shipped implementations; anything that honours the same contract can
//! be swapped in.

use crate::errors::CollaboratorError;
use crate::pipelines::transmutation::ImageUpload;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Options sent along with an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Overwrite an existing object under the same key
    pub upsert: bool,
}

/// Reference to an uploaded object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub public_url: String,
}

/// Blob storage returning a dereferenceable URL for each upload
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageCollaborator: Send + Sync {
    async fn upload(
        &self,
        image: &ImageUpload,
        key: &str,
        options: UploadOptions,
    ) -> Result<StoredObject, CollaboratorError>;
}

/// Image transformation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRequest {
    /// Source image URLs
    pub images: Vec<String>,
    /// Transformation directive
    pub prompt: String,
    /// Output resolution, e.g. "1024x1024"
    pub size: String,
    /// Output quality tier
    pub quality: String,
    /// Number of outputs requested
    pub n: u32,
}

/// Image transformation response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResponse {
    #[serde(default)]
    pub data: Vec<TransformedImage>,
}

/// One generated image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedImage {
    #[serde(default)]
    pub url: Option<String>,
}

impl TransformedImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// Image generation service producing the entity image
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransformCollaborator: Send + Sync {
    async fn transform(
        &self,
        request: TransformRequest,
    ) -> Result<TransformResponse, CollaboratorError>;
}

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, CollaboratorError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("transmutation/", env!("GIT_VERSION")))
        .build()?)
}

/// Turn a non-success response into [`CollaboratorError::Status`]
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, CollaboratorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CollaboratorError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Storage collaborator over HTTP
///
/// `POST <endpoint>/<key>?upsert=<bool>` with the raw image bytes, answered
/// with `{"publicUrl": "..."}`.
pub struct HttpStorageClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpStorageClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl StorageCollaborator for HttpStorageClient {
    async fn upload(
        &self,
        image: &ImageUpload,
        key: &str,
        options: UploadOptions,
    ) -> Result<StoredObject, CollaboratorError> {
        let url = self.object_url(key);
        info!(url = %url, size = image.bytes().len(), "Uploading document");

        let mut request = self
            .client
            .post(&url)
            .query(&[("upsert", options.upsert)])
            .header(CONTENT_TYPE, image.content_type())
            .body(image.bytes().to_vec());
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = check_status(request.send().await?).await?;
        let stored: StoredObject = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Decode(e.to_string()))?;

        if stored.public_url.trim().is_empty() {
            return Err(CollaboratorError::Decode(
                "upload response has an empty publicUrl".to_string(),
            ));
        }

        debug!(public_url = %stored.public_url, "Upload complete");
        Ok(stored)
    }
}

/// Transform collaborator over HTTP
///
/// `POST <endpoint>` with a JSON [`TransformRequest`], answered with a JSON
/// [`TransformResponse`].
pub struct HttpTransformClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransformClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl TransformCollaborator for HttpTransformClient {
    async fn transform(
        &self,
        request: TransformRequest,
    ) -> Result<TransformResponse, CollaboratorError> {
        info!(
            endpoint = %self.endpoint,
            size = %request.size,
            n = request.n,
            "Requesting transform"
        );

        let mut http = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            http = http.bearer_auth(api_key);
        }

        let response = check_status(http.send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| CollaboratorError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve_once, split_request};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn png_upload() -> ImageUpload {
        ImageUpload::new(b"PNGBYTES".to_vec(), "a.png", "image/png")
    }

    #[test]
    fn test_transform_request_wire_format() {
        let request = TransformRequest {
            images: vec!["https://files.example/doc.jpg".into()],
            prompt: "render".into(),
            size: "1024x1024".into(),
            quality: "high".into(),
            n: 1,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["images"][0], "https://files.example/doc.jpg");
        assert_eq!(value["size"], "1024x1024");
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_transform_response_tolerates_missing_fields() {
        let empty: TransformResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.data.is_empty());

        let partial: TransformResponse = serde_json::from_str(r#"{"data":[{}]}"#).unwrap();
        assert_eq!(partial.data[0].url, None);
    }

    #[test]
    fn test_stored_object_wire_format() {
        let stored: StoredObject =
            serde_json::from_str(r#"{"publicUrl":"https://files.example/a.jpg"}"#).unwrap();
        assert_eq!(stored.public_url, "https://files.example/a.jpg");
    }

    #[test]
    fn test_object_url_joins_cleanly() {
        let client =
            HttpStorageClient::new("https://store.example/v1/", None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.object_url("dept-transmutation/documents/1-a.jpg"),
            "https://store.example/v1/dept-transmutation/documents/1-a.jpg"
        );
    }

    #[tokio::test]
    async fn test_upload_sends_image_and_decodes_url() {
        let reply = br#"{"publicUrl":"https://files.example/s/p/a.png"}"#;
        let server = serve_once("200 OK", reply).await;
        let client = HttpStorageClient::new(
            format!("{}/s/", server.base_url),
            Some("secret".into()),
            TIMEOUT,
        )
        .unwrap();

        let stored = client
            .upload(&png_upload(), "p/a.png", UploadOptions { upsert: true })
            .await
            .unwrap();
        assert_eq!(stored.public_url, "https://files.example/s/p/a.png");

        let raw = server.request().await;
        let (head, body) = split_request(&raw);
        assert!(head.starts_with("POST /s/p/a.png?upsert=true HTTP/1.1"), "{}", head);
        let head = head.to_lowercase();
        assert!(head.contains("authorization: bearer secret"));
        assert!(head.contains("content-type: image/png"));
        assert_eq!(body, "PNGBYTES");
    }

    #[tokio::test]
    async fn test_upload_empty_public_url_is_decode_error() {
        let server = serve_once("200 OK", br#"{"publicUrl":"  "}"#).await;
        let client = HttpStorageClient::new(server.base_url.clone(), None, TIMEOUT).unwrap();

        let err = client
            .upload(&png_upload(), "a.png", UploadOptions { upsert: false })
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Decode(_)), "{:?}", err);

        let raw = server.request().await;
        assert!(raw.starts_with("POST /a.png?upsert=false HTTP/1.1"));
        assert!(!raw.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_upload_server_error_keeps_status_and_body() {
        let server = serve_once("500 Internal Server Error", b"boom").await;
        let client = HttpStorageClient::new(server.base_url.clone(), None, TIMEOUT).unwrap();

        let err = client
            .upload(&png_upload(), "a.png", UploadOptions { upsert: true })
            .await
            .unwrap_err();
        match err {
            CollaboratorError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transform_round_trip() {
        let server = serve_once(
            "200 OK",
            br#"{"data":[{"url":"https://gen.example/entity.png"}]}"#,
        )
        .await;
        let endpoint = format!("{}/v1/images/edits", server.base_url);
        let client = HttpTransformClient::new(endpoint, None, TIMEOUT).unwrap();

        let response = client
            .transform(TransformRequest {
                images: vec!["https://files.example/doc.jpg".into()],
                prompt: "render the creature".into(),
                size: "1024x1024".into(),
                quality: "high".into(),
                n: 1,
            })
            .await
            .unwrap();
        assert_eq!(
            response.data,
            vec![TransformedImage::new("https://gen.example/entity.png")]
        );

        let raw = server.request().await;
        let (head, body) = split_request(&raw);
        assert!(head.starts_with("POST /v1/images/edits HTTP/1.1"));
        let head = head.to_lowercase();
        assert!(head.contains("content-type: application/json"));
        assert!(!head.contains("authorization:"));

        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["images"][0], "https://files.example/doc.jpg");
        assert_eq!(sent["prompt"], "render the creature");
        assert_eq!(sent["n"], 1);
    }
}
