//! Persisted polling progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Watermark of the most recently processed notice.
///
/// `last_notice_id == 0` means the board has never been polled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMarker {
    #[serde(default)]
    pub last_notice_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressMarker {
    pub fn new(last_notice_id: u64) -> Self {
        Self {
            last_notice_id,
            updated_at: None,
        }
    }

    /// True before the first successful poll.
    pub fn is_fresh(&self) -> bool {
        self.last_notice_id == 0
    }

    /// True if a notice with this id has not been handled yet.
    pub fn is_new(&self, id: u64) -> bool {
        id > self.last_notice_id
    }

    /// Move the watermark forward. Never moves it back.
    ///
    /// Returns whether the marker changed.
    pub fn advance(&mut self, id: u64) -> bool {
        if id <= self.last_notice_id {
            return false;
        }
        self.last_notice_id = id;
        self.updated_at = Some(Utc::now());
        true
    }
}
