// src/services/feed.rs

//! Feed API client.
//!
//! Two signed GET endpoints: the tab-content listing of a community board
//! and the detail of a single notice. The poller uses the lenient
//! [`NoticeSource`] methods, which log failures and degrade to "nothing";
//! the RSS generator needs the listing error and calls `try_list_notices`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, BoardConfig, Config, NoticeDetail, NoticeSummary};
use crate::services::RequestSigner;
use crate::utils::http;

/// Anything that can list notices and fetch their details.
#[async_trait]
pub trait NoticeSource: Send + Sync {
    /// List the latest notices of a board, propagating every failure.
    async fn try_list_notices(
        &self,
        board: &BoardConfig,
        limit: u32,
    ) -> Result<Vec<NoticeSummary>>;

    /// List the latest notices of a board. Errors yield an empty list.
    async fn list_notices(&self, board: &BoardConfig, limit: u32) -> Vec<NoticeSummary> {
        match self.try_list_notices(board, limit).await {
            Ok(notices) => {
                log::debug!(
                    "Listed {} notices from community-{}/{}",
                    notices.len(),
                    board.community_id,
                    board.tab_key
                );
                notices
            }
            Err(e) => {
                log::error!("Error fetching notices list: {e}");
                Vec::new()
            }
        }
    }

    /// Fetch one notice in full. Errors yield `None`.
    async fn get_detail(&self, notice_id: u64) -> Option<NoticeDetail>;
}

/// Envelope of the tab-content response: `content.notices.data`.
#[derive(Debug, Default, Deserialize)]
struct TabContentResponse {
    #[serde(default)]
    content: Option<TabContent>,
}

#[derive(Debug, Default, Deserialize)]
struct TabContent {
    #[serde(default)]
    notices: Option<NoticePage>,
}

/// Items are decoded one by one in `into_notices`.
#[derive(Debug, Default, Deserialize)]
struct NoticePage {
    #[serde(default)]
    data: Vec<Value>,
}

impl TabContentResponse {
    fn into_notices(self) -> Vec<NoticeSummary> {
        let items = self
            .content
            .and_then(|c| c.notices)
            .map(|p| p.data)
            .unwrap_or_default();

        items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value::<NoticeSummary>(item.clone())
                    .inspect_err(|e| log::warn!("Skipping malformed notice {item}: {e}"))
                    .ok()
            })
            .collect()
    }
}

/// Signed HTTP client for the feed API.
pub struct FeedClient {
    client: Client,
    signer: RequestSigner,
    api: ApiConfig,
}

impl FeedClient {
    /// Create a client from an already configured HTTP client and signer.
    pub fn new(client: Client, signer: RequestSigner, api: ApiConfig) -> Self {
        Self {
            client,
            signer,
            api,
        }
    }

    /// Build the HTTP client and signer from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http::create_async_client(&config.http)?;
        let signer = RequestSigner::new(&config.api.base_url, config.api.hmac_key.as_bytes())?;
        Ok(Self::new(client, signer, config.api.clone()))
    }

    /// Path of the tab-content listing for a board.
    pub fn list_path(board: &BoardConfig) -> String {
        format!(
            "/community/v1.0/community-{}/{}/tabContent?",
            board.community_id, board.tab_key
        )
    }

    /// Path of a single notice.
    pub fn detail_path(notice_id: u64) -> String {
        format!("/notice/v1.0/notice-{notice_id}?")
    }

    /// Query parameters of the listing request.
    pub fn list_params(&self, limit: u32) -> Vec<(&'static str, String)> {
        vec![
            ("appId", self.api.app_id.clone()),
            (
                "fields",
                format!("notices.fieldSet(noticesV1).limit({limit}).pageNo(1)"),
            ),
            ("language", self.api.language.clone()),
            ("os", self.api.os.clone()),
            ("pagingType", "PAGE_NO".to_string()),
            ("platform", self.api.platform.clone()),
            ("wpf", self.api.wpf.clone()),
        ]
    }

    /// Query parameters of the detail request.
    pub fn detail_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("appId", self.api.app_id.clone()),
            ("fieldSet", "noticeV1".to_string()),
            ("language", self.api.language.clone()),
            ("os", self.api.os.clone()),
            ("platform", self.api.platform.clone()),
            ("wpf", self.api.wpf.clone()),
        ]
    }

    /// Fetch a notice detail, propagating every failure.
    pub async fn try_get_detail(&self, notice_id: u64) -> Result<NoticeDetail> {
        let url = self
            .signer
            .sign_now(&Self::detail_path(notice_id), self.detail_params());
        let bytes = self.get_bytes(&url).await?;
        parse_detail(&bytes)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let path = url.split('?').next().unwrap_or(url);
            return Err(AppError::feed(path, format!("status {status}")));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl NoticeSource for FeedClient {
    async fn try_list_notices(
        &self,
        board: &BoardConfig,
        limit: u32,
    ) -> Result<Vec<NoticeSummary>> {
        let url = self
            .signer
            .sign_now(&Self::list_path(board), self.list_params(limit));
        let bytes = self.get_bytes(&url).await?;
        parse_tab_content(&bytes)
    }

    async fn get_detail(&self, notice_id: u64) -> Option<NoticeDetail> {
        self.try_get_detail(notice_id)
            .await
            .inspect_err(|e| log::error!("Error fetching notice detail for {notice_id}: {e}"))
            .ok()
    }
}

/// Unwrap the notice list from a tab-content body.
pub fn parse_tab_content(bytes: &[u8]) -> Result<Vec<NoticeSummary>> {
    let response: TabContentResponse = serde_json::from_slice(bytes)?;
    Ok(response.into_notices())
}

/// Parse a notice detail body.
pub fn parse_detail(bytes: &[u8]) -> Result<NoticeDetail> {
    Ok(serde_json::from_slice(bytes)?)
}
