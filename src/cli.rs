// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the transmutation pipeline
//!
//! This module provides command-line functionality for:
//! - Submitting document images and camera captures
//! - Listing and inspecting classified records
//! - Sharing and downloading transmuted entities

use std::path::{Path, PathBuf};
use std::sync::Arc;
use transmutation::Config;
use transmutation::backends::camera::FileSourceBackend;
use transmutation::backends::collaborators::{HttpStorageClient, HttpTransformClient};
use transmutation::capture::capture_still;
use transmutation::errors::{AppError, AppResult, CaptureError};
use transmutation::export;
use transmutation::pipelines::photo::PhotoEncoder;
use transmutation::pipelines::transmutation::{
    ImageUpload, PipelineConfig, Progress, TransmutationPipeline,
};
use transmutation::record::TransmutationRecord;
use transmutation::storage::{FileMedium, RecordStore};

/// Load the configuration file and apply environment overrides
pub fn load_config(path: Option<&Path>) -> AppResult<Config> {
    Ok(Config::load(path)?.with_env_overrides())
}

/// Submit an image file for transmutation
pub fn submit_document(config: &Config, file: PathBuf, label: Option<String>) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let upload = ImageUpload::from_path(&file).await?;
        println!("Submitting: {}", file.display());
        run_submission(config, upload, label.as_deref()).await
    })
}

/// Capture a still from a camera source and submit it
pub fn capture_document(
    config: &Config,
    source: Option<PathBuf>,
    label: Option<String>,
) -> AppResult<()> {
    let source = source.ok_or_else(|| {
        CaptureError::DeviceUnavailable(
            "no camera device available, pass --source <FILE>".to_string(),
        )
    })?;

    let mut backend = FileSourceBackend::new(source);
    let encoder = PhotoEncoder::with_quality(config.capture.jpeg_quality);
    let upload = capture_still(&mut backend, encoder)?;
    println!(
        "Captured: {} ({} bytes)",
        upload.file_name(),
        upload.bytes().len()
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_submission(config, upload, label.as_deref()))
}

/// List all records, newest first
pub fn list_records(config: &Config) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = rt.block_on(open_store(config));

    if store.is_empty() {
        println!("No classified entities on file.");
        return Ok(());
    }

    println!("Classified entities:");
    println!();
    for record in store.records() {
        println!(
            "  {}  {:<6}  {}  ({})",
            record.case_number(),
            record.classification(),
            record.entity_name(),
            record.submitted_at().format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    println!("{} record(s)", store.len());

    Ok(())
}

/// Show one record in full
pub fn show_record(config: &Config, case_number: &str) -> AppResult<()> {
    let record = find_record(config, case_number)?;
    print_record(&record);
    Ok(())
}

/// Print the share payload for a record as JSON
pub fn share_record(config: &Config, case_number: &str) -> AppResult<()> {
    let record = find_record(config, case_number)?;
    let payload = export::share_payload(&record);
    let json =
        serde_json::to_string_pretty(&payload).map_err(|e| AppError::Export(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// Download the transmuted entity image of a record
pub fn download_record(
    config: &Config,
    case_number: &str,
    output: Option<PathBuf>,
) -> AppResult<()> {
    let record = find_record(config, case_number)?;
    let dir = output.unwrap_or_else(|| config.download_dir());

    let rt = tokio::runtime::Runtime::new()?;
    let path = rt.block_on(export::download_entity(&record, &dir))?;

    println!("Entity saved: {}", path.display());
    Ok(())
}

async fn run_submission(
    config: &Config,
    upload: ImageUpload,
    label: Option<&str>,
) -> AppResult<()> {
    let pipeline = build_pipeline(config).await?;

    let record = pipeline
        .submit_with_progress(upload, label, |progress| match &progress {
            Progress::Step { .. } => println!("{}", progress),
            Progress::Failed { .. } => eprintln!("{}", progress),
        })
        .await?;

    println!();
    print_record(&record);
    Ok(())
}

async fn build_pipeline(config: &Config) -> AppResult<TransmutationPipeline> {
    let pipeline_config = PipelineConfig::from(config);
    let storage = HttpStorageClient::new(
        &config.storage.endpoint,
        config.api_key.clone(),
        pipeline_config.upload_timeout,
    )?;
    let transform = HttpTransformClient::new(
        &config.transform.endpoint,
        config.api_key.clone(),
        pipeline_config.transform_timeout,
    )?;
    let store = open_store(config).await;

    Ok(TransmutationPipeline::new(
        Arc::new(storage),
        Arc::new(transform),
        store,
        pipeline_config,
    ))
}

async fn open_store(config: &Config) -> RecordStore {
    let medium =
        FileMedium::new(config.records_dir()).with_capacity(config.records.capacity_bytes);
    RecordStore::open(Arc::new(medium)).await
}

fn find_record(config: &Config, case_number: &str) -> AppResult<TransmutationRecord> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = rt.block_on(open_store(config));
    store
        .find_by_case_number(case_number)
        .cloned()
        .ok_or_else(|| AppError::Other(format!("No record with case number {}", case_number)))
}

fn print_record(record: &TransmutationRecord) {
    println!("Case number:      {}", record.case_number());
    println!("Entity:           {}", record.entity_name());
    println!("Classification:   {}", record.classification().label());
    println!("Status:           {}", record.status());
    println!("Operator:         {}", record.operator_id());
    println!(
        "Submitted:        {}",
        record.submitted_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Original:         {}", record.original_document());
    println!("Transmuted:       {}", record.transmuted_entity());
}
