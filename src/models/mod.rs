//! Domain models
//!
//! The cached patient record and the report produced after a replay.

pub mod patient;
pub mod report;

// Re-export commonly used types
pub use patient::{PatientRecord, PATIENT_HEADER};
pub use report::{SimulationReport, SnapshotSummary};
