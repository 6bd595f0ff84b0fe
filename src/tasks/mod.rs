//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a replay is in
//! progress.
//!
//! # Tasks
//! - Snapshot: writes the cache to disk at a configured interval
//! - Shutdown: stops a replay early on Ctrl+C or SIGTERM

mod shutdown;
mod snapshot;

pub use shutdown::{run_until_shutdown, shutdown_signal};
pub use snapshot::spawn_snapshot_task;
