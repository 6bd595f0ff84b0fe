//! Patient Cache - A bounded LRU cache for ambulance tablets
//!
//! Keeps the most recently accessed patient records in memory, evicting the
//! least recently used one when full, and writes crash-safe CSV snapshots.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod simulation;
pub mod tasks;

pub use cache::{BoundedCache, CacheStats, SnapshotRecord};
pub use config::Config;
pub use error::{CacheError, Result};
pub use models::{PatientRecord, SimulationReport, PATIENT_HEADER};
pub use tasks::spawn_snapshot_task;
