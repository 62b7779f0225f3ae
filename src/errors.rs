// SPDX-License-Identifier: MPL-2.0

//! Error types for the transmutation core
//!
//! Each layer has its own error enum. Every variant that reaches
//! [`PipelineError`] is terminal for the submission in progress; nothing
//! is retried automatically.

use crate::pipelines::transmutation::PipelineState;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Top-level error used by the command line surface
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Service error: {0}")]
    Collaborator(#[from] CollaboratorError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Export error: {0}")]
    Export(String),
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

/// Camera capture errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// The device could not be acquired (missing, denied or already in use)
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),
    /// The live surface had no usable frame, or the frame could not be encoded
    #[error("Capture failed: {0}")]
    CaptureFailed(String),
}

/// Failures reported by the external storage and transform collaborators
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body could not be understood
    #[error("malformed response: {0}")]
    Decode(String),
    /// The call did not finish within its deadline
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// The service refused the request
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Why the transform stage failed
#[derive(Debug, Error)]
pub enum TransformFailure {
    /// The collaborator call itself failed
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    /// The collaborator answered without any output image
    #[error("transform returned no images")]
    EmptyResult,
    /// The output entry carried no usable reference
    #[error("transform returned an image without a URL")]
    MissingUrl,
}

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The durable medium rejected the read or write
    #[error("record medium error: {0}")]
    Medium(#[from] MediumError),
    /// The stored payload could not be parsed
    #[error("stored records are corrupt: {0}")]
    Corrupt(String),
    /// The record sequence could not be serialized
    #[error("failed to serialize records: {0}")]
    Serialize(String),
    /// A record with this id already exists
    #[error("record {0} already exists")]
    DuplicateId(String),
}

/// Durable medium errors
#[derive(Debug, Error)]
pub enum MediumError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The write would exceed the medium's capacity
    #[error("capacity exceeded: {required} bytes needed, {capacity} available")]
    CapacityExceeded { required: u64, capacity: u64 },
}

/// Errors terminating a single submission
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input is not an image the pipeline can submit
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Another submission is already in flight
    #[error("a submission is already in progress ({0})")]
    Busy(PipelineState),
    #[error("upload failed: {0}")]
    UploadFailed(#[source] CollaboratorError),
    #[error("transform failed: {0}")]
    TransformFailed(#[source] TransformFailure),
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl PipelineError {
    /// Whether the failure happened before any external call was made
    pub fn is_local(&self) -> bool {
        matches!(self, PipelineError::InvalidInput(_) | PipelineError::Busy(_))
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
