// SPDX-License-Identifier: GPL-3.0-only

//! Sharing and downloading transmuted entities

use crate::backends::collaborators::{build_client, check_status};
use crate::constants::export::{DOWNLOAD_EXTENSION, SHARE_TITLE_SUFFIX};
use crate::constants::timing::DOWNLOAD_TIMEOUT;
use crate::errors::{AppError, AppResult};
use crate::record::TransmutationRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a platform share sheet receives for a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

pub fn share_payload(record: &TransmutationRecord) -> SharePayload {
    SharePayload {
        title: format!("{} - {}", record.entity_name(), SHARE_TITLE_SUFFIX),
        text: format!("Classified Entity: {}", record.case_number()),
        url: record.transmuted_entity().to_string(),
    }
}

/// `<caseNumber>-<entityName>.png`, with path separators replaced
pub fn download_file_name(record: &TransmutationRecord) -> String {
    let name = format!(
        "{}-{}.{}",
        record.case_number(),
        record.entity_name(),
        DOWNLOAD_EXTENSION
    );
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// Fetch the transmuted entity image and write it into `dir`
///
/// Returns the path of the written file. The directory is created if needed.
pub async fn download_entity(record: &TransmutationRecord, dir: &Path) -> AppResult<PathBuf> {
    let client = build_client(DOWNLOAD_TIMEOUT).map_err(|e| AppError::Export(e.to_string()))?;
    let url = record.transmuted_entity();
    info!(url = %url, case_number = %record.case_number(), "Downloading entity");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Export(e.to_string()))?;
    let bytes = check_status(response)
        .await
        .map_err(|e| AppError::Export(e.to_string()))?
        .bytes()
        .await
        .map_err(|e| AppError::Export(e.to_string()))?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(download_file_name(record));
    tokio::fs::write(&path, &bytes).await?;

    info!(path = %path.display(), size = bytes.len(), "Entity saved");
    Ok(path)
}
