//! Error types for the patient cache
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its ingestion boundary.
///
/// A missing key is not an error: `BoundedCache::get` returns `None`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache was configured with an unusable parameter (e.g. zero capacity)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Filesystem operation failed while reading input or writing a snapshot
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input file is structurally unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CacheError {
    /// Builds an `Io` error for `action` on `path`.
    pub fn io(action: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        CacheError::Io {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the patient cache.
pub type Result<T> = std::result::Result<T, CacheError>;
