//! Local filesystem progress store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ProgressMarker;
use crate::storage::ProgressStore;
use crate::utils::fs::{read_optional, write_atomic};

/// Progress marker kept in a JSON file.
#[derive(Debug, Clone)]
pub struct LocalProgressStore {
    path: PathBuf,
}

impl LocalProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProgressStore for LocalProgressStore {
    async fn load(&self) -> ProgressMarker {
        let bytes = match read_optional(&self.path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                log::info!("No progress file at {}", self.path.display());
                return ProgressMarker::default();
            }
            Err(e) => {
                log::error!("Error reading progress file {}: {e}", self.path.display());
                return ProgressMarker::default();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            log::error!(
                "Progress file {} is corrupt ({e}), treating as first run",
                self.path.display()
            );
            ProgressMarker::default()
        })
    }

    async fn save(&self, marker: &ProgressMarker) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(marker)?;
        write_atomic(&self.path, &bytes).await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
