// src/services/webhook.rs

//! Chat webhook sink.
//!
//! Renders a notice as a Discord-style message: one main embed with the
//! title, a shortened body and the first image, followed by image-only
//! embeds for further photos so clients show them as a gallery.

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, Result};
use crate::models::{DispatchNotice, WebhookConfig};
use crate::services::NoticeSink;

const NO_CONTENT: &str = "No content";
const ELLIPSIS: &str = "...";

/// Webhook request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookPayload {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedImage {
    pub url: String,
}

/// Posts notices to a chat webhook.
pub struct WebhookSink {
    client: Client,
    url: String,
    config: WebhookConfig,
}

impl WebhookSink {
    pub fn new(client: Client, url: impl Into<String>, config: WebhookConfig) -> Self {
        Self {
            client,
            url: url.into(),
            config,
        }
    }

    /// Build the sink if a webhook URL is configured.
    pub fn from_config(client: Client, config: &WebhookConfig) -> Option<Self> {
        config
            .url
            .as_ref()
            .map(|url| Self::new(client, url.clone(), config.clone()))
    }

    /// Render the request body for a notice.
    pub fn payload(&self, notice: &DispatchNotice) -> WebhookPayload {
        build_payload(notice, &self.config)
    }
}

#[async_trait]
impl NoticeSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn dispatch(&self, notice: &DispatchNotice) -> Result<()> {
        let payload = self.payload(notice);
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::sink(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::sink(self.name(), format!("status {status}")));
        }

        log::info!("Webhook sent for notice: {}", notice.id);
        Ok(())
    }
}

/// Render a notice into a webhook payload.
pub fn build_payload(notice: &DispatchNotice, config: &WebhookConfig) -> WebhookPayload {
    let link = notice
        .share_url
        .clone()
        .unwrap_or_else(|| config.fallback_url.clone());

    let description = match notice.body.as_deref().filter(|b| !b.is_empty()) {
        Some(body) => shorten(body, config.max_description_chars),
        None => NO_CONTENT.to_string(),
    };

    let mut images = notice.images.iter().take(config.max_images);

    let main = Embed {
        title: Some(notice.title.clone()),
        description: Some(description),
        url: Some(link.clone()),
        timestamp: notice
            .published_at()
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        color: Some(config.color),
        image: images.next().map(|url| EmbedImage { url: url.clone() }),
    };

    let mut embeds = vec![main];
    embeds.extend(images.map(|url| Embed {
        url: Some(link.clone()),
        image: Some(EmbedImage { url: url.clone() }),
        ..Embed::default()
    }));

    let mut content = format!("{}: {}", config.content_prefix, notice.title);
    if !config.mention.is_empty() {
        content.push(' ');
        content.push_str(&config.mention);
    }

    WebhookPayload { content, embeds }
}

/// Keep at most `max` user-perceived characters, marking the cut.
fn shorten(text: &str, max: usize) -> String {
    let mut graphemes = text.grapheme_indices(true);
    match graphemes.nth(max) {
        Some((idx, _)) => format!("{}{}", &text[..idx], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(images: usize) -> DispatchNotice {
        DispatchNotice {
            id: 101,
            title: "New tour dates".to_string(),
            body: Some("Details inside".to_string()),
            share_url: Some("https://weverse.io/notice/101".to_string()),
            publish_at: 1_700_000_000_000,
            images: (0..images)
                .map(|i| format!("https://img.example/{i}.jpg"))
                .collect(),
        }
    }

    #[test]
    fn test_main_embed() {
        let payload = build_payload(&notice(0), &WebhookConfig::default());
        assert_eq!(payload.content, "Weverse Notice: New tour dates @everyone");
        assert_eq!(payload.embeds.len(), 1);

        let main = &payload.embeds[0];
        assert_eq!(main.title.as_deref(), Some("New tour dates"));
        assert_eq!(main.description.as_deref(), Some("Details inside"));
        assert_eq!(main.url.as_deref(), Some("https://weverse.io/notice/101"));
        assert_eq!(main.timestamp.as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(main.color, Some(0x8daace));
        assert!(main.image.is_none());
    }

    #[test]
    fn test_gallery_is_capped() {
        let payload = build_payload(&notice(6), &WebhookConfig::default());
        assert_eq!(payload.embeds.len(), 4);
        assert_eq!(
            payload.embeds[0].image.as_ref().unwrap().url,
            "https://img.example/0.jpg"
        );
        assert_eq!(
            payload.embeds[3].image.as_ref().unwrap().url,
            "https://img.example/3.jpg"
        );
        assert!(payload.embeds[1].title.is_none());
        assert_eq!(
            payload.embeds[1].url.as_deref(),
            Some("https://weverse.io/notice/101")
        );
    }

    #[test]
    fn test_zero_max_images_sends_none() {
        let config = WebhookConfig {
            max_images: 0,
            ..WebhookConfig::default()
        };
        let payload = build_payload(&notice(3), &config);
        assert_eq!(payload.embeds.len(), 1);
        assert!(payload.embeds[0].image.is_none());
    }

    #[test]
    fn test_missing_body_and_link() {
        let mut n = notice(0);
        n.body = None;
        n.share_url = None;
        let payload = build_payload(&n, &WebhookConfig::default());
        assert_eq!(payload.embeds[0].description.as_deref(), Some(NO_CONTENT));
        assert_eq!(payload.embeds[0].url.as_deref(), Some("https://weverse.io/"));
    }

    #[test]
    fn test_long_body_is_shortened() {
        let mut n = notice(0);
        n.body = Some("가".repeat(600));
        let payload = build_payload(&n, &WebhookConfig::default());
        let description = payload.embeds[0].description.clone().unwrap();
        assert!(description.ends_with(ELLIPSIS));
        assert_eq!(description.chars().count(), 503);
    }

    #[test]
    fn test_shorten_exact_length_untouched() {
        assert_eq!(shorten("abc", 3), "abc");
        assert_eq!(shorten("abcd", 3), "abc...");
    }

    #[test]
    fn test_empty_mention() {
        let config = WebhookConfig {
            mention: String::new(),
            ..WebhookConfig::default()
        };
        let payload = build_payload(&notice(0), &config);
        assert_eq!(payload.content, "Weverse Notice: New tour dates");
    }

    #[test]
    fn test_serialized_shape() {
        let payload = build_payload(&notice(2), &WebhookConfig::default());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["embeds"][1]["image"]["url"], "https://img.example/1.jpg");
        assert!(json["embeds"][1].get("title").is_none());
    }

    #[test]
    fn test_sink_disabled_without_url() {
        let client = Client::new();
        assert!(WebhookSink::from_config(client, &WebhookConfig::default()).is_none());
    }
}
