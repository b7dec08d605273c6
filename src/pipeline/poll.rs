// src/pipeline/poll.rs

//! One poll cycle: load marker, list, diff, dispatch, commit.
//!
//! Notices are handled strictly one after another in ascending id order.
//! The marker is persisted after each notice, so a crash re-delivers at
//! most the notice that was in flight and never skips a later one.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{BoardConfig, Config, DispatchNotice};
use crate::pipeline::diff::compute_new;
use crate::services::{FeedClient, LogSink, NoticeSink, NoticeSource, WebhookSink};
use crate::storage::ProgressStore;
use crate::utils::http;

/// Summary of a poll cycle.
#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub started_at: DateTime<Utc>,
    pub fetched: usize,
    pub dispatched: usize,
    pub detail_fallbacks: usize,
    pub sink_failures: usize,
    pub bootstrap: bool,
    pub marker_before: u64,
    pub marker_after: u64,
}

impl PollReport {
    /// Empty report for a cycle starting at `marker`.
    pub fn new(marker: u64) -> Self {
        Self {
            started_at: Utc::now(),
            fetched: 0,
            dispatched: 0,
            detail_fallbacks: 0,
            sink_failures: 0,
            bootstrap: false,
            marker_before: marker,
            marker_after: marker,
        }
    }
}

/// Run one poll cycle against the given collaborators.
pub async fn run_poll(
    source: &dyn NoticeSource,
    store: &dyn ProgressStore,
    sinks: &[Box<dyn NoticeSink>],
    board: &BoardConfig,
) -> Result<PollReport> {
    let mut marker = store.load().await;
    let mut report = PollReport::new(marker.last_notice_id);

    let fetched = source.list_notices(board, board.limit).await;
    report.fetched = fetched.len();

    if fetched.is_empty() {
        log::info!("No notices found.");
        return Ok(report);
    }

    let diff = compute_new(fetched, &marker);

    if diff.bootstrap {
        if let Some(latest) = diff.latest_id {
            log::info!("First run. Initializing with latest notice ID: {latest}");
            marker.advance(latest);
            store.save(&marker).await?;
        }
        report.bootstrap = true;
        report.marker_after = marker.last_notice_id;
        return Ok(report);
    }

    if diff.is_empty() {
        log::info!("No new notices.");
        return Ok(report);
    }

    for summary in diff.new_notices {
        log::info!("New notice found: {}", summary.id);

        let detail = source.get_detail(summary.id).await;
        if detail.is_none() {
            report.detail_fallbacks += 1;
            log::warn!("Using listing data for notice {}", summary.id);
        }
        let notice = DispatchNotice::merge(&summary, detail);

        for sink in sinks {
            if let Err(e) = sink.dispatch(&notice).await {
                report.sink_failures += 1;
                log::error!("Sink {} failed for notice {}: {e}", sink.name(), notice.id);
            }
        }

        marker.advance(summary.id);
        store.save(&marker).await?;
        report.dispatched += 1;
    }

    report.marker_after = marker.last_notice_id;
    log::info!(
        "State updated. Last notice ID: {} ({})",
        marker.last_notice_id,
        store.location()
    );
    Ok(report)
}

/// Build the sinks described by the configuration.
///
/// Without a webhook URL, notices are only logged.
pub fn build_sinks(config: &Config) -> Result<Vec<Box<dyn NoticeSink>>> {
    let client = http::create_async_client(&config.http)?;
    let sink: Box<dyn NoticeSink> = match WebhookSink::from_config(client, &config.webhook) {
        Some(webhook) => Box::new(webhook),
        None => {
            log::warn!("No webhook configured, new notices will only be logged");
            Box::new(LogSink)
        }
    };
    Ok(vec![sink])
}

/// Validate the configuration, then run one poll cycle with the feed API.
pub async fn run_check(config: &Config, store: &dyn ProgressStore) -> Result<PollReport> {
    config.validate()?;

    log::info!(
        "Starting notice check for community-{}/{}",
        config.board.community_id,
        config.board.tab_key
    );

    let source = FeedClient::from_config(config)?;
    let sinks = build_sinks(config)?;
    run_poll(&source, store, &sinks, &config.board).await
}
