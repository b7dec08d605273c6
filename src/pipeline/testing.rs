//! In-memory collaborators for pipeline tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{BoardConfig, DispatchNotice, NoticeDetail, NoticeSummary, ProgressMarker};
use crate::services::{NoticeSink, NoticeSource};
use crate::storage::{MemoryProgressStore, ProgressStore};

/// Serves a fixed listing and optional details.
#[derive(Default)]
pub struct FakeSource {
    pub notices: Vec<NoticeSummary>,
    pub details: HashMap<u64, NoticeDetail>,
    /// Listing fails like an unreachable API.
    pub unreachable: bool,
    calls: Mutex<Vec<u64>>,
}

impl FakeSource {
    pub fn with_ids(ids: &[u64]) -> Self {
        Self {
            notices: ids
                .iter()
                .map(|&id| NoticeSummary {
                    id,
                    title: format!("Notice {id}"),
                    body: Some(format!("body {id}")),
                    share_url: None,
                    publish_at: 1_700_000_000_000 + id as i64,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn detail_calls(&self) -> Vec<u64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NoticeSource for FakeSource {
    async fn try_list_notices(
        &self,
        _board: &BoardConfig,
        _limit: u32,
    ) -> Result<Vec<NoticeSummary>> {
        if self.unreachable {
            return Err(AppError::feed("tabContent", "connection refused"));
        }
        Ok(self.notices.clone())
    }

    async fn get_detail(&self, notice_id: u64) -> Option<NoticeDetail> {
        self.calls.lock().unwrap().push(notice_id);
        self.details.get(&notice_id).cloned()
    }
}

/// Records every dispatched notice; optionally reports failure afterwards.
#[derive(Clone, Default)]
pub struct RecordingSink {
    received: Arc<Mutex<Vec<DispatchNotice>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn notices(&self) -> Vec<DispatchNotice> {
        self.received.lock().unwrap().clone()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.notices().iter().map(|n| n.id).collect()
    }
}

#[async_trait]
impl NoticeSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn dispatch(&self, notice: &DispatchNotice) -> Result<()> {
        self.received.lock().unwrap().push(notice.clone());
        if self.fail {
            return Err(AppError::sink(self.name(), "rejected"));
        }
        Ok(())
    }
}

pub fn sinks(sink: &RecordingSink) -> Vec<Box<dyn NoticeSink>> {
    vec![Box::new(sink.clone())]
}

/// Accepts a fixed number of saves, then fails like a full disk.
pub struct FlakyStore {
    pub inner: MemoryProgressStore,
    remaining: Mutex<usize>,
}

impl FlakyStore {
    pub fn new(marker: ProgressMarker, successful_saves: usize) -> Self {
        Self {
            inner: MemoryProgressStore::new(marker),
            remaining: Mutex::new(successful_saves),
        }
    }
}

#[async_trait]
impl ProgressStore for FlakyStore {
    async fn load(&self) -> ProgressMarker {
        self.inner.load().await
    }

    async fn save(&self, marker: &ProgressMarker) -> Result<()> {
        {
            let mut remaining = self.remaining.lock().unwrap();
            if *remaining == 0 {
                return Err(AppError::Io(std::io::Error::other("no space left on device")));
            }
            *remaining -= 1;
        }
        self.inner.save(marker).await
    }

    fn location(&self) -> String {
        "flaky".to_string()
    }
}
