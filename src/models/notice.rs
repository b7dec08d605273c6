//! Notice data structures as returned by the feed API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A notice as listed by the tab-content endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoticeSummary {
    /// Board-unique, increasing identifier
    #[serde(rename = "noticeId")]
    pub id: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Plain-text excerpt
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub share_url: Option<String>,

    /// Publication time in Unix milliseconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub publish_at: i64,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl NoticeSummary {
    /// Publication time, if the millisecond timestamp is representable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.publish_at)
    }
}

/// A single notice as returned by the detail endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoticeDetail {
    #[serde(rename = "noticeId", default)]
    pub id: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default)]
    pub body: Option<String>,

    /// Full notice text without markup
    #[serde(default)]
    pub plain_body: Option<String>,

    #[serde(default)]
    pub share_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub publish_at: i64,

    #[serde(default)]
    pub attachment: Option<Attachment>,
}

impl NoticeDetail {
    /// Image URLs attached to the notice.
    pub fn image_urls(&self) -> Vec<String> {
        self.attachment
            .as_ref()
            .map(|a| a.photo.values().map(|p| p.url.clone()).collect())
            .unwrap_or_default()
    }
}

/// Attachments of a notice detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// Photos keyed by an opaque photo key
    #[serde(default)]
    pub photo: BTreeMap<String, Photo>,
}

/// An attached photo. Only the URL is used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    pub url: String,
}

/// The value handed to every sink for one new notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchNotice {
    pub id: u64,
    pub title: String,
    pub body: Option<String>,
    pub share_url: Option<String>,
    pub publish_at: i64,
    pub images: Vec<String>,
}

impl DispatchNotice {
    /// Combine a listed notice with its detail, if one could be fetched.
    ///
    /// Detail fields win; the summary fills whatever the detail lacks. The
    /// identifier always comes from the summary.
    pub fn merge(summary: &NoticeSummary, detail: Option<NoticeDetail>) -> Self {
        let Some(detail) = detail else {
            return Self::from(summary);
        };

        let images = detail.image_urls();
        let title = if detail.title.is_empty() {
            summary.title.clone()
        } else {
            detail.title
        };

        Self {
            id: summary.id,
            title,
            body: detail
                .plain_body
                .or(detail.body)
                .or_else(|| summary.body.clone()),
            share_url: detail.share_url.or_else(|| summary.share_url.clone()),
            publish_at: if detail.publish_at != 0 {
                detail.publish_at
            } else {
                summary.publish_at
            },
            images,
        }
    }

    /// Publication time, if the millisecond timestamp is representable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.publish_at)
    }
}

impl From<&NoticeSummary> for DispatchNotice {
    fn from(summary: &NoticeSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title.clone(),
            body: summary.body.clone(),
            share_url: summary.share_url.clone(),
            publish_at: summary.publish_at,
            images: Vec::new(),
        }
    }
}
