//! Cache Module
//!
//! Bounded LRU cache with mutex-guarded access and crash-safe snapshots.

mod lru;
mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use lru::{RecencyList, SlotId};
pub use snapshot::{temp_path, write_atomic, write_rows, SnapshotRecord};
pub use stats::CacheStats;
pub use store::BoundedCache;
