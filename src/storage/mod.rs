//! Storage abstractions for polling progress.
//!
//! The progress marker is the only state the relay owns:
//!
//! ```text
//! state.json    { "lastNoticeId": 123456, "updatedAt": "2026-10-19T09:30:00Z" }
//! ```
//!
//! Backends:
//! - `LocalProgressStore`: JSON file, replaced via temp file + rename
//! - `MemoryProgressStore` (tests only): in-process, records every save
//! - `S3ProgressStore` (feature `s3`): single S3 object

pub mod local;
#[cfg(test)]
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ProgressMarker;

// Re-export for convenience
pub use local::LocalProgressStore;
#[cfg(test)]
pub use memory::MemoryProgressStore;
#[cfg(feature = "s3")]
pub use s3::S3ProgressStore;

/// Trait for progress marker backends.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the marker.
    ///
    /// Missing or unreadable state yields the default marker, which the
    /// poller treats as a first run.
    async fn load(&self) -> ProgressMarker;

    /// Replace the stored marker. A failed save leaves the previous value
    /// intact.
    async fn save(&self, marker: &ProgressMarker) -> Result<()>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}
