//! In-memory progress store.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ProgressMarker;
use crate::storage::ProgressStore;

/// Keeps the marker in process memory and records every save.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    marker: Mutex<ProgressMarker>,
    history: Mutex<Vec<u64>>,
}

impl MemoryProgressStore {
    pub fn new(marker: ProgressMarker) -> Self {
        Self {
            marker: Mutex::new(marker),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Current marker value.
    pub fn current(&self) -> ProgressMarker {
        self.marker
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Ids persisted so far, in save order.
    pub fn history(&self) -> Vec<u64> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(&self) -> ProgressMarker {
        self.current()
    }

    async fn save(&self, marker: &ProgressMarker) -> Result<()> {
        if let Ok(mut current) = self.marker.lock() {
            *current = marker.clone();
        }
        if let Ok(mut history) = self.history.lock() {
            history.push(marker.last_notice_id);
        }
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
