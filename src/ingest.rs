//! Ingestion Module
//!
//! Loads patient-access CSV files into `PatientRecord`s.
//!
//! Columns are found by case-insensitive header name with aliases, so
//! `ID`, `id` and `patient_id` all resolve to the key column. Bad rows are
//! skipped or defaulted one at a time; only a missing header or key column
//! fails the whole load.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::codec::{self, Record};
use crate::error::{CacheError, Result};
use crate::models::PatientRecord;

const ID_ALIASES: &[&str] = &["patient_id", "id"];
const NAME_ALIASES: &[&str] = &["name"];
const AGE_ALIASES: &[&str] = &["age"];
const LAST_VISIT_ALIASES: &[&str] = &["last_visit"];
const ACCESS_ALIASES: &[&str] = &["access_timestamp", "access_time"];
const NOTES_ALIASES: &[&str] = &["notes"];

// == Ingest Outcome ==
/// Records loaded from an access log, in file order.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub records: Vec<PatientRecord>,
    /// Rows dropped because they had no usable patient id
    pub skipped: usize,
}

// == Column Map ==
/// Positions of the known columns within a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub id: usize,
    pub name: Option<usize>,
    pub age: Option<usize>,
    pub last_visit: Option<usize>,
    pub access_timestamp: Option<usize>,
    pub notes: Option<usize>,
}

impl ColumnMap {
    /// Resolves column positions from a header row.
    ///
    /// # Errors
    /// `CacheError::InvalidInput` if no id column is present.
    pub fn from_header(header: &[String]) -> Result<Self> {
        let names: Vec<String> = header
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| names.iter().position(|n| n == alias))
        };

        let id = find(ID_ALIASES).ok_or_else(|| {
            CacheError::InvalidInput(format!(
                "header has no patient id column (expected one of: {})",
                ID_ALIASES.join(", ")
            ))
        })?;

        Ok(Self {
            id,
            name: find(NAME_ALIASES),
            age: find(AGE_ALIASES),
            last_visit: find(LAST_VISIT_ALIASES),
            access_timestamp: find(ACCESS_ALIASES),
            notes: find(NOTES_ALIASES),
        })
    }

    /// Builds a record from one data row, or None if it has no usable id.
    fn record(&self, row: &Record) -> Option<PatientRecord> {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.fields.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let patient_id = field(Some(self.id));
        if patient_id.is_empty() {
            return None;
        }

        let raw_age = field(self.age);
        let age = if raw_age.is_empty() {
            0
        } else {
            leading_int(&raw_age).unwrap_or_else(|| {
                debug!("Line {}: unparseable age {:?}, using 0", row.line, raw_age);
                0
            })
        };

        Some(PatientRecord {
            patient_id,
            name: field(self.name),
            age,
            last_visit: field(self.last_visit),
            access_timestamp: field(self.access_timestamp),
            notes: field(self.notes),
        })
    }
}

/// Parses the integer at the start of `text`, ignoring anything after it,
/// so `"34.0"` and `"34 yrs"` both read as 34. Out-of-range values are None.
fn leading_int(text: &str) -> Option<i32> {
    let unsigned = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let end = text.len() - unsigned.len() + digits;
    text[..end].parse().ok()
}

// == Parse ==
/// Parses access-log text whose first row is a header.
///
/// A leading UTF-8 byte order mark is ignored.
pub fn parse_patient_accesses(input: &str) -> Result<IngestOutcome> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut rows = codec::parse_records(input).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| CacheError::InvalidInput("empty file".to_string()))?;
    let columns = ColumnMap::from_header(&header.fields)?;

    let mut outcome = IngestOutcome::default();
    for row in rows {
        match columns.record(&row) {
            Some(record) => outcome.records.push(record),
            None => {
                warn!(
                    "Line {}: skipping row without a patient id ({} fields)",
                    row.line,
                    row.fields.len()
                );
                outcome.skipped += 1;
            }
        }
    }
    Ok(outcome)
}

// == Load ==
/// Reads and parses an access-log file.
pub fn load_patient_accesses(path: &Path) -> Result<IngestOutcome> {
    let text = fs::read_to_string(path).map_err(|e| CacheError::io("read", path, e))?;
    let outcome = parse_patient_accesses(&text)?;
    debug!(
        "Parsed {} records ({} skipped) from {}",
        outcome.records.len(),
        outcome.skipped,
        path.display()
    );
    Ok(outcome)
}
