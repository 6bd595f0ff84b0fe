//! Patient record model
//!
//! The value cached on the ambulance tablet, keyed by `patient_id`.

use serde::Serialize;

use crate::cache::SnapshotRecord;

/// Snapshot header, in the order `PatientRecord::to_fields` emits them.
pub const PATIENT_HEADER: &[&str] = &[
    "patient_id",
    "name",
    "age",
    "last_visit",
    "access_timestamp",
    "notes",
];

/// One patient as seen by the tablet.
///
/// Timestamps are kept as the strings found in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub name: String,
    pub age: i32,
    /// ISO timestamp of the last hospital visit
    pub last_visit: String,
    /// When the record was last opened on the tablet
    pub access_timestamp: String,
    pub notes: String,
}

impl PatientRecord {
    /// Creates a record with only an id set.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Self::default()
        }
    }
}

impl SnapshotRecord for PatientRecord {
    fn to_fields(&self) -> Vec<String> {
        vec![
            self.patient_id.clone(),
            self.name.clone(),
            self.age.to_string(),
            self.last_visit.clone(),
            self.access_timestamp.clone(),
            self.notes.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_row_quotes_awkward_fields() {
        let record = PatientRecord {
            patient_id: "P001".to_string(),
            name: "Doe, Jane".to_string(),
            age: 34,
            last_visit: "2024-01-02T10:00:00Z".to_string(),
            access_timestamp: "2024-02-01T08:30:00Z".to_string(),
            notes: "allergic to \"penicillin\"".to_string(),
        };

        assert_eq!(
            record.to_row(),
            "P001,\"Doe, Jane\",34,2024-01-02T10:00:00Z,2024-02-01T08:30:00Z,\"allergic to \"\"penicillin\"\"\""
        );
    }

    #[test]
    fn test_fields_match_header_length() {
        assert_eq!(PatientRecord::new("x").to_fields().len(), PATIENT_HEADER.len());
    }

    #[test]
    fn test_new_defaults_age_to_zero() {
        let record = PatientRecord::new("P9");
        assert_eq!(record.patient_id, "P9");
        assert_eq!(record.age, 0);
        assert!(record.notes.is_empty());
    }

    #[test]
    fn test_serialize_json() {
        let json = serde_json::to_string(&PatientRecord::new("P1")).unwrap();
        assert!(json.contains("\"patient_id\":\"P1\""));
    }
}
