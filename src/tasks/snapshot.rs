//! Periodic Snapshot Task
//!
//! Background task that writes the cache to disk at a fixed interval.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{BoundedCache, SnapshotRecord};

/// Spawns a background task that snapshots `cache` to `path` every
/// `interval_secs` seconds.
///
/// Each write runs on the blocking pool since it holds the cache lock while
/// doing file I/O. A failed snapshot is logged and retried on the next tick;
/// it never stops the task.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(BoundedCache::new(100)?);
/// let handle = spawn_snapshot_task(cache.clone(), "cache.csv".into(), Some(PATIENT_HEADER), 30);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_snapshot_task<K, V>(
    cache: Arc<BoundedCache<K, V>>,
    path: PathBuf,
    header: Option<&'static [&'static str]>,
    interval_secs: u64,
) -> JoinHandle<()>
where
    K: Eq + std::hash::Hash + Clone + Send + 'static,
    V: Clone + SnapshotRecord + Send + 'static,
{
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting snapshot task for {} with interval of {} seconds",
            path.display(),
            interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let cache = Arc::clone(&cache);
            let target = path.clone();
            let result =
                tokio::task::spawn_blocking(move || cache.snapshot(&target, header)).await;

            match result {
                Ok(Ok(rows)) => debug!("Periodic snapshot: wrote {} entries", rows),
                Ok(Err(e)) => warn!("Periodic snapshot failed: {}", e),
                Err(e) => warn!("Periodic snapshot task panicked: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientRecord, PATIENT_HEADER};
    use std::fs;

    fn patient_cache() -> Arc<BoundedCache<String, PatientRecord>> {
        Arc::new(BoundedCache::new(10).unwrap())
    }

    #[tokio::test]
    async fn test_snapshot_task_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("periodic.csv");
        let cache = patient_cache();
        cache.put("P1".to_string(), PatientRecord::new("P1"));

        let handle = spawn_snapshot_task(cache.clone(), path.clone(), Some(PATIENT_HEADER), 1);

        // Wait for at least one tick
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.abort();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("patient_id,name,age"));
        assert!(content.contains("P1,,0,,,"));
    }

    #[tokio::test]
    async fn test_snapshot_task_survives_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("periodic.csv");
        let cache = patient_cache();

        let handle = spawn_snapshot_task(cache, path, None, 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!handle.is_finished(), "Task should keep running after a failed write");
        handle.abort();
    }

    #[tokio::test]
    async fn test_snapshot_task_can_be_aborted() {
        let handle = spawn_snapshot_task(
            patient_cache(),
            PathBuf::from("unused.csv"),
            None,
            60,
        );

        // Abort immediately
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
