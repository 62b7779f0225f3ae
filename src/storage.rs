// SPDX-License-Identifier: MPL-2.0

//! Durable record storage
//!
//! The record sequence is kept newest-first and persisted as one JSON blob
//! under [`STORAGE_KEY`]. Every append rewrites the whole blob; the in-memory
//! view only changes after the durable write has succeeded.

use crate::constants::records::{CORRUPT_KEY, STORAGE_KEY};
use crate::errors::{MediumError, StoreError, StoreResult};
use crate::record::TransmutationRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Key-addressed byte store that survives process restarts
#[async_trait]
pub trait RecordMedium: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError>;

    /// Replace the value stored under `key`
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MediumError>;
}

/// Check a payload against an optional capacity
fn check_capacity(capacity: Option<u64>, len: usize) -> Result<(), MediumError> {
    match capacity {
        Some(capacity) if len as u64 > capacity => Err(MediumError::CapacityExceeded {
            required: len as u64,
            capacity,
        }),
        _ => Ok(()),
    }
}

/// Medium storing one file per key inside a data directory
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
    capacity: Option<u64>,
}

impl FileMedium {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            capacity: None,
        }
    }

    /// Limit the size of any single stored value
    pub fn with_capacity(mut self, bytes: u64) -> Self {
        self.capacity = Some(bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(file_name)
    }
}

#[async_trait]
impl RecordMedium for FileMedium {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), size = bytes.len(), "Read record medium");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MediumError> {
        check_capacity(self.capacity, bytes.len())?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp_path = path.with_extension("tmp");

        tokio::fs::write(&tmp_path, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(path = %path.display(), size = bytes.len(), "Wrote record medium");
        Ok(())
    }
}

/// Process-local medium, lost on exit
#[derive(Debug, Default)]
pub struct MemoryMedium {
    values: Mutex<HashMap<String, Vec<u8>>>,
    capacity: Option<u64>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the size of any single stored value
    pub fn with_capacity(bytes: u64) -> Self {
        Self {
            values: Mutex::default(),
            capacity: Some(bytes),
        }
    }

    /// Store a raw value directly, bypassing capacity checks
    pub fn insert_raw(&self, key: &str, bytes: Vec<u8>) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), bytes);
    }
}

#[async_trait]
impl RecordMedium for MemoryMedium {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MediumError> {
        check_capacity(self.capacity, bytes.len())?;
        self.insert_raw(key, bytes.to_vec());
        Ok(())
    }
}

/// Ordered, append-only record store
pub struct RecordStore {
    medium: Arc<dyn RecordMedium>,
    records: Vec<TransmutationRecord>,
}

impl RecordStore {
    /// Load the store, failing if the durable payload is unreadable
    pub async fn load(medium: Arc<dyn RecordMedium>) -> StoreResult<Self> {
        let records = read_records(medium.as_ref()).await?;
        info!(count = records.len(), "Loaded transmutation records");
        Ok(Self { medium, records })
    }

    /// Load the store, starting empty if the durable payload is unreadable
    ///
    /// A payload that fails to decode is copied to [`CORRUPT_KEY`] first, so
    /// the next append cannot destroy the only copy of the old records.
    pub async fn open(medium: Arc<dyn RecordMedium>) -> Self {
        match read_records(medium.as_ref()).await {
            Ok(records) => {
                info!(count = records.len(), "Loaded transmutation records");
                Self { medium, records }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load transmutation records, starting empty");
                if matches!(e, StoreError::Corrupt(_)) {
                    preserve_corrupt_payload(medium.as_ref()).await;
                }
                Self {
                    medium,
                    records: Vec::new(),
                }
            }
        }
    }

    /// Re-read the full sequence from durable storage
    pub async fn load_all(&self) -> StoreResult<Vec<TransmutationRecord>> {
        read_records(self.medium.as_ref()).await
    }

    /// Add a record as the new head and persist the whole sequence
    ///
    /// On error the record is not committed and the in-memory view is left
    /// exactly as it was.
    pub async fn append(&mut self, record: TransmutationRecord) -> StoreResult<()> {
        if self.get(record.id()).is_some() {
            return Err(StoreError::DuplicateId(record.id().to_string()));
        }

        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record);
        next.extend(self.records.iter().cloned());

        let payload =
            serde_json::to_vec(&next).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.medium.write(STORAGE_KEY, &payload).await?;

        debug!(
            id = %next[0].id(),
            case_number = %next[0].case_number(),
            count = next.len(),
            "Record committed"
        );
        self.records = next;
        Ok(())
    }

    /// All records, newest first
    pub fn records(&self) -> &[TransmutationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recently stored record
    pub fn latest(&self) -> Option<&TransmutationRecord> {
        self.records.first()
    }

    pub fn get(&self, id: &str) -> Option<&TransmutationRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Look up a record by case number (case-insensitive)
    pub fn find_by_case_number(&self, case_number: &str) -> Option<&TransmutationRecord> {
        self.records
            .iter()
            .find(|r| r.case_number().eq_ignore_ascii_case(case_number.trim()))
    }
}

async fn read_records(medium: &dyn RecordMedium) -> StoreResult<Vec<TransmutationRecord>> {
    match medium.read(STORAGE_KEY).await? {
        Some(bytes) => {
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
        }
        None => Ok(Vec::new()),
    }
}

/// Copy the unreadable payload aside, logging instead of failing
async fn preserve_corrupt_payload(medium: &dyn RecordMedium) {
    let bytes = match medium.read(STORAGE_KEY).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "Failed to re-read corrupt record payload");
            return;
        }
    };

    match medium.write(CORRUPT_KEY, &bytes).await {
        Ok(()) => warn!(
            key = CORRUPT_KEY,
            size = bytes.len(),
            "Corrupt record payload preserved"
        ),
        Err(e) => warn!(error = %e, "Failed to preserve corrupt record payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Classification, NewRecord};
    use chrono::Utc;

    fn record(n: usize) -> TransmutationRecord {
        TransmutationRecord::create(NewRecord {
            case_number: format!("DT-2026-{:04}", n),
            entity_name: format!("Entity-{}", n),
            original_document: format!("https://files.example/doc-{}.jpg", n),
            transmuted_entity: format!("https://files.example/entity-{}.png", n),
            submitted_at: Utc::now(),
            classification: Classification::Safe,
            operator_id: "OP-7749".into(),
        })
    }

    #[tokio::test]
    async fn test_append_then_load_all() {
        let medium = Arc::new(MemoryMedium::new());
        let mut store = RecordStore::load(medium.clone()).await.unwrap();
        assert!(store.is_empty());

        store.append(record(1)).await.unwrap();
        let newest = record(2);
        store.append(newest.clone()).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], newest);
        assert_eq!(loaded, store.records());
    }

    #[tokio::test]
    async fn test_reload_reproduces_fields() {
        let medium = Arc::new(MemoryMedium::new());
        let mut store = RecordStore::load(medium.clone()).await.unwrap();
        let original = record(1);
        store.append(original.clone()).await.unwrap();

        let reopened = RecordStore::load(medium).await.unwrap();
        assert_eq!(reopened.latest(), Some(&original));
    }

    #[tokio::test]
    async fn test_capacity_exceeded_keeps_view() {
        let medium = Arc::new(MemoryMedium::with_capacity(600));
        let mut store = RecordStore::load(medium).await.unwrap();
        store.append(record(1)).await.unwrap();

        let err = store.append(record(2)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Medium(MediumError::CapacityExceeded { .. })
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let mut store = RecordStore::load(Arc::new(MemoryMedium::new()))
            .await
            .unwrap();
        let r = record(1);
        store.append(r.clone()).await.unwrap();
        assert!(matches!(
            store.append(r).await,
            Err(StoreError::DuplicateId(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_payload() {
        let medium = Arc::new(MemoryMedium::new());
        medium.insert_raw(STORAGE_KEY, b"{not json".to_vec());

        assert!(matches!(
            RecordStore::load(medium.clone()).await,
            Err(StoreError::Corrupt(_))
        ));

        let store = RecordStore::open(medium).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_open_keeps_unreadable_records_aside() {
        let medium = Arc::new(MemoryMedium::new());
        let mut legacy = serde_json::to_value(vec![record(1)]).unwrap();
        legacy[0]["classification"] = "APOLLYON".into();
        let legacy = serde_json::to_vec(&legacy).unwrap();
        medium.insert_raw(STORAGE_KEY, legacy.clone());

        let mut store = RecordStore::open(medium.clone()).await;
        assert!(store.is_empty());
        store.append(record(2)).await.unwrap();

        assert_eq!(medium.read(CORRUPT_KEY).await.unwrap(), Some(legacy));
        assert_eq!(store.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_medium_keeps_corrupt_payload() {
        let dir = tempfile::tempdir().unwrap();
        let medium = Arc::new(FileMedium::new(dir.path()));
        medium.write(STORAGE_KEY, b"[{\"id\":").await.unwrap();

        let mut store = RecordStore::open(medium.clone()).await;
        store.append(record(1)).await.unwrap();

        assert_eq!(
            std::fs::read(dir.path().join(CORRUPT_KEY)).unwrap(),
            b"[{\"id\":"
        );
    }

    #[tokio::test]
    async fn test_find_by_case_number() {
        let mut store = RecordStore::load(Arc::new(MemoryMedium::new()))
            .await
            .unwrap();
        store.append(record(1)).await.unwrap();
        store.append(record(2)).await.unwrap();

        let found = store.find_by_case_number(" dt-2026-0001 ").unwrap();
        assert_eq!(found.entity_name(), "Entity-1");
        assert!(store.find_by_case_number("DT-2026-0003").is_none());
    }

    #[tokio::test]
    async fn test_file_medium_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let medium = Arc::new(FileMedium::new(dir.path().join("records")));
        let mut store = RecordStore::load(medium).await.unwrap();
        let r = record(1);
        store.append(r.clone()).await.unwrap();

        let reopened = RecordStore::load(Arc::new(FileMedium::new(dir.path().join("records"))))
            .await
            .unwrap();
        assert_eq!(reopened.records(), &[r]);
    }

    #[tokio::test]
    async fn test_file_medium_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::new(dir.path());
        assert!(medium.read("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_medium_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::new(dir.path()).with_capacity(4);
        medium.write("k", b"1234").await.unwrap();
        assert!(medium.write("k", b"12345").await.is_err());
        assert_eq!(medium.read("k").await.unwrap().unwrap(), b"1234");
    }
}
