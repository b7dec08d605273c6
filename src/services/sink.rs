//! Dispatch sinks.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::DispatchNotice;

/// A consumer of new notices.
///
/// Sinks are fire-and-forget from the poller's perspective: an error is
/// logged by the caller and never retried.
#[async_trait]
pub trait NoticeSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Emit one notice.
    async fn dispatch(&self, notice: &DispatchNotice) -> Result<()>;
}

/// Writes each notice to the log.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl NoticeSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn dispatch(&self, notice: &DispatchNotice) -> Result<()> {
        log::info!(
            "New notice {}: {} ({})",
            notice.id,
            notice.title,
            notice.share_url.as_deref().unwrap_or("no link")
        );
        Ok(())
    }
}
