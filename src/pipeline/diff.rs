//! Incremental diff between a fresh listing and the progress marker.
//!
//! The listing arrives in no particular order. The diff sorts it by id,
//! drops duplicate ids, and keeps only notices above the watermark. On the
//! very first run nothing is reported as new; the caller only records the
//! newest id so that historic notices are not replayed.

use crate::models::{NoticeSummary, ProgressMarker};

/// Result of comparing a listing with the marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOutcome {
    /// New notices, ascending by id
    pub new_notices: Vec<NoticeSummary>,
    /// First run: record `latest_id`, dispatch nothing
    pub bootstrap: bool,
    /// Highest id in the listing, if it was not empty
    pub latest_id: Option<u64>,
    /// Number of duplicate ids dropped from the listing
    pub duplicates: usize,
}

impl DiffOutcome {
    /// True if there is nothing to dispatch.
    pub fn is_empty(&self) -> bool {
        self.new_notices.is_empty()
    }

    /// Ids of the new notices, in dispatch order.
    pub fn new_ids(&self) -> Vec<u64> {
        self.new_notices.iter().map(|n| n.id).collect()
    }
}

/// Compute the notices that are new relative to `marker`.
pub fn compute_new(mut fetched: Vec<NoticeSummary>, marker: &ProgressMarker) -> DiffOutcome {
    if fetched.is_empty() {
        return DiffOutcome::default();
    }

    fetched.sort_by_key(|n| n.id);

    let before = fetched.len();
    fetched.dedup_by(|later, earlier| {
        let duplicate = later.id == earlier.id;
        if duplicate {
            log::error!(
                "Duplicate notice id {} in listing, skipping '{}'",
                later.id,
                later.title
            );
        }
        duplicate
    });
    let duplicates = before - fetched.len();
    let latest_id = fetched.last().map(|n| n.id);

    if marker.is_fresh() {
        return DiffOutcome {
            new_notices: Vec::new(),
            bootstrap: true,
            latest_id,
            duplicates,
        };
    }

    let new_notices = fetched
        .into_iter()
        .filter(|n| marker.is_new(n.id))
        .collect();

    DiffOutcome {
        new_notices,
        bootstrap: false,
        latest_id,
        duplicates,
    }
}
