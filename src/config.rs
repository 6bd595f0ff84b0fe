//! Configuration Module
//!
//! Handles loading cache and report settings from environment variables.
//! Command-line flags override these values in `main`.

use std::env;
use std::path::PathBuf;

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Where the final snapshot is written
    pub snapshot_path: PathBuf,
    /// Interval in seconds between background snapshots, 0 disables them
    pub snapshot_interval: u64,
    /// Number of most recently used keys listed in the report
    pub top_n: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 100)
    /// - `SNAPSHOT_PATH` - Snapshot destination (default: cache_contents.csv)
    /// - `SNAPSHOT_INTERVAL` - Background snapshot interval in seconds (default: 0, disabled)
    /// - `REPORT_TOP_N` - Keys listed in the report (default: 10)
    ///
    /// Unparseable values fall back to the default. A capacity of 0 is kept
    /// as-is and rejected when the cache is built.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            snapshot_interval: env::var("SNAPSHOT_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.snapshot_interval),
            top_n: env::var("REPORT_TOP_N")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_n),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 100,
            snapshot_path: PathBuf::from("cache_contents.csv"),
            snapshot_interval: 0,
            top_n: 10,
        }
    }
}
