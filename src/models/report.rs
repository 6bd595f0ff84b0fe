//! Simulation report
//!
//! Summary printed after a replay, as plain text or JSON.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;

/// Where and how much the final snapshot wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub path: String,
    pub rows: usize,
}

/// Outcome of replaying an access log through the cache.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// When the report was produced (RFC 3339 in JSON)
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub records_loaded: usize,
    pub rows_skipped: usize,
    pub hits: u64,
    pub misses: u64,
    /// hits / (hits + misses); absent when nothing was looked up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_ratio: Option<f64>,
    pub evictions: u64,
    pub final_size: usize,
    pub capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotSummary>,
    /// Most recently used keys, most recent first
    pub most_recent: Vec<String>,
}

impl SimulationReport {
    /// Builds a report from final cache statistics.
    pub fn new(
        input: impl Into<String>,
        records_loaded: usize,
        rows_skipped: usize,
        stats: &CacheStats,
        most_recent: Vec<String>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            input: input.into(),
            records_loaded,
            rows_skipped,
            hits: stats.hits,
            misses: stats.misses,
            hit_ratio: stats.hit_ratio(),
            evictions: stats.evictions,
            final_size: stats.total_entries,
            capacity: stats.capacity,
            snapshot: None,
            most_recent,
        }
    }

    pub fn with_snapshot(mut self, path: impl Into<String>, rows: usize) -> Self {
        self.snapshot = Some(SnapshotSummary {
            path: path.into(),
            rows,
        });
        self
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Loaded {} patient access records from {}",
            self.records_loaded, self.input
        )?;
        if self.rows_skipped > 0 {
            writeln!(f, "Skipped {} malformed rows", self.rows_skipped)?;
        }
        writeln!(
            f,
            "Simulation complete. Cache capacity={}, final size={}",
            self.capacity, self.final_size
        )?;
        write!(f, "Hits={}, Misses={}", self.hits, self.misses)?;
        if let Some(ratio) = self.hit_ratio {
            write!(f, ", Hit ratio={:.3}", ratio)?;
        }
        writeln!(f, ", Evictions={}", self.evictions)?;
        match &self.snapshot {
            Some(snapshot) => writeln!(
                f,
                "Wrote {} cache entries to {}",
                snapshot.rows, snapshot.path
            )?,
            None => writeln!(f, "Cache contents were not written")?,
        }
        writeln!(
            f,
            "Most-recently-used patient IDs (top {}):",
            self.most_recent.len()
        )?;
        for key in &self.most_recent {
            writeln!(f, "  {}", key)?;
        }
        Ok(())
    }
}
