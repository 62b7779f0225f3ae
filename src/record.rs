// SPDX-License-Identifier: GPL-3.0-only

//! Transmutation records
//!
//! A record is the unit of persisted state. It is built once, at the end of
//! a successful pipeline run, and never modified afterwards. Field names are
//! serialized in camelCase so the stored payload keeps the layout of the
//! `dept_transmutation_records` array.

use crate::constants::records::ID_PREFIX;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Risk classification assigned to a completed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Safe,
    Euclid,
    Keter,
}

impl Classification {
    /// All classifications, in ascending risk order
    pub const ALL: [Classification; 3] = [
        Classification::Safe,
        Classification::Euclid,
        Classification::Keter,
    ];

    /// Label as printed on case files
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Safe => "SAFE",
            Classification::Euclid => "EUCLID",
            Classification::Keter => "KETER",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Lifecycle marker of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Processing,
    /// Every completed record is written with this status
    #[default]
    Classified,
    Archived,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Processing => write!(f, "PROCESSING"),
            RecordStatus::Classified => write!(f, "CLASSIFIED"),
            RecordStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// A persisted transmutation outcome
///
/// Fields are private; a record can only be read after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmutationRecord {
    id: String,
    case_number: String,
    entity_name: String,
    original_document: String,
    transmuted_entity: String,
    submitted_at: DateTime<Utc>,
    status: RecordStatus,
    classification: Classification,
    operator_id: String,
}

/// Everything needed to mint a record
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub case_number: String,
    pub entity_name: String,
    pub original_document: String,
    pub transmuted_entity: String,
    pub submitted_at: DateTime<Utc>,
    pub classification: Classification,
    pub operator_id: String,
}

impl TransmutationRecord {
    /// Mint a classified record with a fresh identifier
    pub fn create(new: NewRecord) -> Self {
        Self {
            id: generate_record_id(),
            case_number: new.case_number,
            entity_name: new.entity_name,
            original_document: new.original_document,
            transmuted_entity: new.transmuted_entity,
            submitted_at: new.submitted_at,
            status: RecordStatus::Classified,
            classification: new.classification,
            operator_id: new.operator_id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn case_number(&self) -> &str {
        &self.case_number
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// URL of the uploaded source document
    pub fn original_document(&self) -> &str {
        &self.original_document
    }

    /// URL of the generated entity image
    pub fn transmuted_entity(&self) -> &str {
        &self.transmuted_entity
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn operator_id(&self) -> &str {
        &self.operator_id
    }
}

/// Generate a globally unique record identifier
fn generate_record_id() -> String {
    format!("{}{}", ID_PREFIX, Uuid::new_v4().simple())
}
