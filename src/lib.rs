// SPDX-License-Identifier: MPL-2.0

//! Department of Transmutation - turn hand-drawn documents into classified entities
//!
//! This library provides the core functionality of the transmutation service,
//! including document capture, image transformation and record keeping.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera devices and external storage/transform collaborators
//! - [`capture`]: Scoped camera sessions producing JPEG uploads
//! - [`pipelines`]: Frame encoding and the transmutation pipeline
//! - [`classification`]: Case numbers, entity names and risk tiers
//! - [`record`]: The persisted record model
//! - [`storage`]: Durable, newest-first record store
//! - [`export`]: Sharing and downloading transmuted entities
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let store = RecordStore::open(Arc::new(FileMedium::new(config.records_dir()))).await;
//! let config = PipelineConfig::from(&config);
//! let pipeline = TransmutationPipeline::new(storage, transform, store, config);
//! let record = pipeline.submit(ImageUpload::from_path(path).await?, Some("Gloop")).await?;
//! println!("{} is {}", record.case_number(), record.classification());
//! ```

pub mod backends;
pub mod capture;
pub mod classification;
pub mod config;
pub mod constants;
pub mod errors;
pub mod export;
pub mod pipelines;
pub mod record;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use capture::CaptureSession;
pub use config::Config;
pub use pipelines::transmutation::{ImageUpload, PipelineState, Progress, TransmutationPipeline};
pub use record::{Classification, RecordStatus, TransmutationRecord};
pub use storage::RecordStore;
