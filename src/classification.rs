// SPDX-License-Identifier: GPL-3.0-only

//! Case number and classification synthesis
//!
//! Case numbers are a pure function of the submission year and the number of
//! records already stored. Classification is drawn uniformly at random and
//! carries no information about the submitted image.

use crate::constants::case_numbers::{ENTITY_NAME_PREFIX, PREFIX, SEQUENCE_WIDTH};
use crate::record::Classification;
use rand::Rng;

/// Result of synthesizing identifiers for a new record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub case_number: String,
    pub classification: Classification,
}

/// Build the case number for the next record
///
/// The sequence is `record_count + 1`, zero-padded to four digits. Past 9999
/// the sequence keeps growing and the number gets wider.
pub fn case_number(year: i32, record_count: usize) -> String {
    format!(
        "{}-{}-{:0width$}",
        PREFIX,
        year,
        record_count + 1,
        width = SEQUENCE_WIDTH
    )
}

/// Draw a classification uniformly from [`Classification::ALL`]
pub fn random_classification<R: Rng + ?Sized>(rng: &mut R) -> Classification {
    Classification::ALL[rng.random_range(0..Classification::ALL.len())]
}

/// Resolve the entity name from an operator label
///
/// Labels are trimmed; a missing or blank label becomes `Entity-<count + 1>`.
pub fn entity_name(label: Option<&str>, record_count: usize) -> String {
    match label.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => format!("{}-{}", ENTITY_NAME_PREFIX, record_count + 1),
    }
}

/// Synthesize the case number and classification for a new record
pub fn synthesize<R: Rng + ?Sized>(record_count: usize, year: i32, rng: &mut R) -> Synthesis {
    Synthesis {
        case_number: case_number(year, record_count),
        classification: random_classification(rng),
    }
}

/// Check that a case number has the `DT-<yyyy>-<nnnn>` shape
pub fn is_valid_case_number(case_number: &str) -> bool {
    let mut parts = case_number.splitn(3, '-');
    let (Some(prefix), Some(year), Some(sequence)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == PREFIX
        && year.len() == 4
        && year.bytes().all(|b| b.is_ascii_digit())
        && sequence.len() >= SEQUENCE_WIDTH
        && sequence.bytes().all(|b| b.is_ascii_digit())
}
