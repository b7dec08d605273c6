// src/pipeline/rss.rs

//! RSS generation pipeline.

use std::path::PathBuf;

use chrono::Utc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{FeedClient, NoticeSource, RssRenderer};
use crate::utils::fs::write_atomic;

/// Render the latest notices of the configured board to the RSS file.
///
/// Returns the written path, or `None` when the listing came back empty and
/// the previous feed was left in place. A failed listing is an error.
pub async fn run_rss(config: &Config, source: &dyn NoticeSource) -> Result<Option<PathBuf>> {
    let board = &config.board;
    log::info!(
        "Generating RSS: community={}, tab={}, limit={}",
        board.community_id,
        board.tab_key,
        config.rss.limit
    );

    let mut notices = source
        .try_list_notices(board, config.rss.limit)
        .await
        .inspect_err(|e| log::error!("Error fetching notices list: {e}"))?;
    if notices.is_empty() {
        log::warn!("No notices listed, keeping the existing feed");
        return Ok(None);
    }

    // Newest first.
    notices.sort_by(|a, b| b.id.cmp(&a.id));

    let xml = RssRenderer::new(board, &config.rss).render(&notices, Utc::now());
    let path = config.rss.output_path.clone();
    write_atomic(&path, xml.as_bytes()).await?;

    log::info!("RSS written to {} ({} items)", path.display(), notices.len());
    Ok(Some(path))
}

/// Validate the configuration, then render the feed from the feed API.
pub async fn run_rss_with_feed(config: &Config) -> Result<Option<PathBuf>> {
    config.validate()?;
    let source = FeedClient::from_config(config)?;
    run_rss(config, &source).await
}
