//! Access replay
//!
//! Drives the cache the way the tablet does: look a patient up, and on a
//! miss load the record into the cache.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

use crate::cache::BoundedCache;
use crate::models::PatientRecord;

/// Counts from one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub processed: usize,
    pub hits: u64,
    pub misses: u64,
    /// Set when the replay stopped before the end of the log
    pub interrupted: bool,
}

/// Replays `accesses` in order against `cache`.
///
/// A hit refreshes the cached record's `access_timestamp` and writes it
/// back; a miss inserts the access record as-is.
pub fn replay(
    cache: &BoundedCache<String, PatientRecord>,
    accesses: &[PatientRecord],
) -> ReplaySummary {
    replay_until(cache, accesses, &AtomicBool::new(false))
}

/// Like `replay`, but checks `stop` before each access and returns early
/// once it is set.
pub fn replay_until(
    cache: &BoundedCache<String, PatientRecord>,
    accesses: &[PatientRecord],
    stop: &AtomicBool,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for access in accesses {
        if stop.load(Ordering::Relaxed) {
            summary.interrupted = true;
            break;
        }
        match cache.get(&access.patient_id) {
            Some(mut cached) => {
                summary.hits += 1;
                cached.access_timestamp = access.access_timestamp.clone();
                cache.put(access.patient_id.clone(), cached);
            }
            None => {
                summary.misses += 1;
                trace!("Miss for {}, loading record", access.patient_id);
                cache.put(access.patient_id.clone(), access.clone());
            }
        }
        summary.processed += 1;
    }

    summary
}
