// SPDX-License-Identifier: GPL-3.0-only

//! Transmutation pipeline
//!
//! Takes a raw image and an optional label and produces a persisted,
//! classified record:
//!
//! ```text
//! ImageUpload → Upload → Transform → Synthesize → Persist → TransmutationRecord
//!                 ↓          ↓
//!            Storage    Transform
//!          collaborator collaborator
//! ```
//!
//! # Guarantees
//!
//! - A record reaches the store only after both external calls succeed.
//! - Any stage failure aborts the submission; already uploaded objects are
//!   left orphaned in external storage.
//! - Submissions are serialized: a second `submit` while one is in flight
//!   fails with [`PipelineError::Busy`], so case numbers cannot collide.
//! - No stage is retried.

pub mod input;
pub mod progress;
pub mod state;

pub use input::{ImageUpload, upload_key};
pub use progress::Progress;
pub use state::PipelineState;

use crate::backends::collaborators::{
    StorageCollaborator, TransformCollaborator, TransformRequest, TransformResponse,
    UploadOptions,
};
use crate::classification;
use crate::config::Config;
use crate::constants::upload::{KEY_ENTROPY_CHARS, KEY_PREFIX};
use crate::constants::{DEFAULT_OPERATOR_ID, timing, transform};
use crate::errors::{CollaboratorError, PipelineError, TransformFailure};
use crate::record::{NewRecord, TransmutationRecord};
use crate::storage::RecordStore;
use chrono::{Datelike, Local, Utc};
use progress::{ProgressTracker, steps};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, error, info, warn};

/// Settings fixed for the lifetime of a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Operator identifier stamped on every record
    pub operator_id: String,
    /// Prefix of upload keys
    pub key_prefix: String,
    /// Transformation directive
    pub prompt: String,
    /// Output resolution
    pub size: String,
    /// Output quality tier
    pub quality: String,
    pub upload_timeout: Duration,
    pub transform_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            operator_id: DEFAULT_OPERATOR_ID.to_string(),
            key_prefix: KEY_PREFIX.to_string(),
            prompt: transform::PROMPT.to_string(),
            size: transform::SIZE.to_string(),
            quality: transform::QUALITY.to_string(),
            upload_timeout: timing::UPLOAD_TIMEOUT,
            transform_timeout: timing::TRANSFORM_TIMEOUT,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            operator_id: config.operator_id.clone(),
            key_prefix: config.storage.key_prefix.clone(),
            prompt: config.transform.prompt.clone(),
            size: config.transform.size.clone(),
            quality: config.transform.quality.clone(),
            upload_timeout: Duration::from_secs(config.storage.timeout_secs),
            transform_timeout: Duration::from_secs(config.transform.timeout_secs),
        }
    }
}

/// Submit-to-persist orchestration
pub struct TransmutationPipeline {
    storage: Arc<dyn StorageCollaborator>,
    transform: Arc<dyn TransformCollaborator>,
    store: RwLock<RecordStore>,
    config: PipelineConfig,
    state: watch::Sender<PipelineState>,
    slot: Mutex<()>,
}

impl TransmutationPipeline {
    pub fn new(
        storage: Arc<dyn StorageCollaborator>,
        transform: Arc<dyn TransformCollaborator>,
        store: RecordStore,
        config: PipelineConfig,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            storage,
            transform,
            store: RwLock::new(store),
            config,
            state,
            slot: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current state of the most recent submission
    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Snapshot of all records, newest first
    pub async fn records(&self) -> Vec<TransmutationRecord> {
        self.store.read().await.records().to_vec()
    }

    pub async fn record_count(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn find_by_case_number(&self, case_number: &str) -> Option<TransmutationRecord> {
        self.store
            .read()
            .await
            .find_by_case_number(case_number)
            .cloned()
    }

    /// Run one submission without observing progress
    pub async fn submit(
        &self,
        upload: ImageUpload,
        label: Option<&str>,
    ) -> Result<TransmutationRecord, PipelineError> {
        self.submit_with_progress(upload, label, |_| {}).await
    }

    /// Run one submission, reporting progress at each stage boundary
    ///
    /// The observer receives non-decreasing percentages ending in 100, or a
    /// single [`Progress::Failed`] when the submission aborts or is rejected
    /// as [`PipelineError::Busy`].
    pub async fn submit_with_progress<F>(
        &self,
        upload: ImageUpload,
        label: Option<&str>,
        progress: F,
    ) -> Result<TransmutationRecord, PipelineError>
    where
        F: FnMut(Progress) + Send,
    {
        let mut tracker = ProgressTracker::new(progress);
        let Ok(_slot) = self.slot.try_lock() else {
            let err = PipelineError::Busy(self.state());
            warn!(file = %upload.file_name(), error = %err, "Submission rejected");
            tracker.fail(&err);
            return Err(err);
        };

        let previous = self.state.send_replace(PipelineState::Idle);
        if previous.is_in_progress() {
            warn!(state = %previous, "Previous submission was abandoned mid-flight");
        }

        let result = self.run(&upload, label, &mut tracker).await;

        match &result {
            Ok(record) => {
                self.transition(PipelineState::Persisted);
                tracker.step(steps::COMPLETE);
                info!(
                    id = %record.id(),
                    case_number = %record.case_number(),
                    classification = %record.classification(),
                    "Transmutation complete"
                );
            }
            Err(e) => {
                self.transition(PipelineState::Failed);
                tracker.fail(e);
                error!(error = %e, file = %upload.file_name(), "Failed to process transmutation");
            }
        }

        result
    }

    async fn run<F>(
        &self,
        upload: &ImageUpload,
        label: Option<&str>,
        tracker: &mut ProgressTracker<F>,
    ) -> Result<TransmutationRecord, PipelineError>
    where
        F: FnMut(Progress) + Send,
    {
        tracker.step(steps::RECEIVED);
        let format = upload.validate()?;
        debug!(
            file = %upload.file_name(),
            ?format,
            size = upload.bytes().len(),
            "Document received"
        );

        // Stage 1: upload the source document
        self.transition(PipelineState::Uploading);
        tracker.step(steps::UPLOADING);
        let key = upload_key(
            &self.config.key_prefix,
            upload.file_name(),
            Utc::now(),
            KEY_ENTROPY_CHARS,
        );
        let stored = with_timeout(
            self.config.upload_timeout,
            self.storage
                .upload(upload, &key, UploadOptions { upsert: true }),
        )
        .await
        .map_err(PipelineError::UploadFailed)?;
        info!(key = %key, public_url = %stored.public_url, "Document uploaded");

        // Stage 2: transform into the entity image
        self.transition(PipelineState::Transforming);
        tracker.step(steps::ANALYZING);
        let request = self.transform_request(stored.public_url.clone());
        tracker.step(steps::TRANSFORMING);
        let response = with_timeout(
            self.config.transform_timeout,
            self.transform.transform(request),
        )
        .await
        .map_err(|e| PipelineError::TransformFailed(e.into()))?;
        let transmuted_entity = first_output(response).map_err(PipelineError::TransformFailed)?;

        // Stage 3: synthesize identifiers against the current record count
        self.transition(PipelineState::Synthesizing);
        tracker.step(steps::FINALIZING);
        let mut store = self.store.write().await;
        let count = store.len();
        let submitted_at = Utc::now();
        let synthesis = {
            let mut rng = rand::rng();
            // Case numbers follow the operator's calendar, not UTC
            let year = submitted_at.with_timezone(&Local).year();
            classification::synthesize(count, year, &mut rng)
        };
        let record = TransmutationRecord::create(NewRecord {
            case_number: synthesis.case_number,
            entity_name: classification::entity_name(label, count),
            original_document: stored.public_url,
            transmuted_entity,
            submitted_at,
            classification: synthesis.classification,
            operator_id: self.config.operator_id.clone(),
        });

        // Stage 4: persist as the new head of the sequence
        self.transition(PipelineState::Persisting);
        store.append(record.clone()).await?;

        Ok(record)
    }

    fn transform_request(&self, source_url: String) -> TransformRequest {
        TransformRequest {
            images: vec![source_url],
            prompt: self.config.prompt.clone(),
            size: self.config.size.clone(),
            quality: self.config.quality.clone(),
            n: transform::OUTPUT_COUNT,
        }
    }

    fn transition(&self, next: PipelineState) {
        let current = self.state();
        if !current.can_transition_to(next) {
            warn!(from = %current, to = %next, "Unexpected pipeline transition");
        }
        debug!(from = %current, to = %next, "Pipeline transition");
        self.state.send_replace(next);
    }
}

/// Await a collaborator call, failing with a timeout error past `limit`
async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, CollaboratorError>>,
) -> Result<T, CollaboratorError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| CollaboratorError::Timeout(limit))?
}

/// Extract the single output URL from a transform response
fn first_output(response: TransformResponse) -> Result<String, TransformFailure> {
    let count = response.data.len();
    let first = response
        .data
        .into_iter()
        .next()
        .ok_or(TransformFailure::EmptyResult)?;
    if count > 1 {
        warn!(count, "Transform returned extra images, using the first");
    }

    match first.url {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => Err(TransformFailure::MissingUrl),
    }
}
