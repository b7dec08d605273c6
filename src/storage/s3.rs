//! AWS S3 progress store.
//!
//! The marker lives in a single object; `PutObject` replaces it as a whole,
//! so readers never observe a partially written marker.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::ProgressMarker;
use crate::storage::ProgressStore;

/// S3-based progress store.
#[derive(Clone)]
pub struct S3ProgressStore {
    client: Client,
    bucket: String,
    key: String,
}

impl S3ProgressStore {
    /// Create a new S3 progress store.
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create the store from environment configuration.
    ///
    /// - `S3_BUCKET`: bucket name (required)
    /// - `S3_PROGRESS_KEY`: object key (default: `notice-relay/state.json`)
    pub async fn from_env() -> Result<Self> {
        let bucket = std::env::var("S3_BUCKET")
            .map_err(|_| AppError::config("S3_BUCKET is not set"))?;
        let key = std::env::var("S3_PROGRESS_KEY")
            .unwrap_or_else(|_| "notice-relay/state.json".to_string());

        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Ok(Self::new(Client::new(&config), bucket, key))
    }

    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::S3(e.to_string()))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(AppError::S3(service_err.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl ProgressStore for S3ProgressStore {
    async fn load(&self) -> ProgressMarker {
        match self.read_bytes().await {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::error!("Progress object {} is corrupt ({e}), treating as first run", self.location());
                ProgressMarker::default()
            }),
            Ok(None) => {
                log::info!("No progress object at {}", self.location());
                ProgressMarker::default()
            }
            Err(e) => {
                log::error!("Error reading progress object {}: {e}", self.location());
                ProgressMarker::default()
            }
        }
    }

    async fn save(&self, marker: &ProgressMarker) -> Result<()> {
        let json = serde_json::to_vec_pretty(marker)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(json))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::S3(e.to_string()))?;

        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
