// src/services/rss.rs

//! RSS 2.0 rendering of a notice listing.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{BoardConfig, NoticeSummary, RssConfig};

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Escape text for use in XML element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE).to_string()
}

/// Renders a board listing as an RSS channel.
#[derive(Debug, Clone)]
pub struct RssRenderer<'a> {
    board: &'a BoardConfig,
    config: &'a RssConfig,
}

impl<'a> RssRenderer<'a> {
    pub fn new(board: &'a BoardConfig, config: &'a RssConfig) -> Self {
        Self { board, config }
    }

    fn site(&self) -> &str {
        self.config.site_url.trim_end_matches('/')
    }

    /// Stable, non-permalink item identifier.
    pub fn guid(&self, notice: &NoticeSummary) -> String {
        format!("weverse-{}-{}", self.board.community_id, notice.id)
    }

    /// Item link: the share URL, else the notice page on the site.
    pub fn link(&self, notice: &NoticeSummary) -> String {
        notice
            .share_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("{}/notice/{}", self.site(), notice.id))
    }

    fn render_item(&self, out: &mut String, notice: &NoticeSummary) {
        let pub_date = notice
            .published_at()
            .map(http_date)
            .unwrap_or_default();
        let description = notice
            .body
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(notice.title.as_str());

        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\n    <item>\n      <title>{}</title>\n      <link>{}</link>\n      \
             <guid isPermaLink=\"false\">{}</guid>\n      <pubDate>{}</pubDate>\n      \
             <description>{}</description>\n    </item>",
            escape_xml(&notice.title),
            escape_xml(&self.link(notice)),
            escape_xml(&self.guid(notice)),
            pub_date,
            escape_xml(description),
        );
    }

    /// Render the full document, items in the given order.
    pub fn render(&self, notices: &[NoticeSummary], now: DateTime<Utc>) -> String {
        let mut items = String::new();
        for notice in notices {
            self.render_item(&mut items, notice);
        }

        let community = &self.board.community_id;
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <rss version=\"2.0\">\n  <channel>\n    \
             <title>{title}</title>\n    \
             <link>{link}</link>\n    \
             <description>{description}</description>\n    \
             <language>{language}</language>\n    \
             <lastBuildDate>{built}</lastBuildDate>{items}\n  </channel>\n</rss>\n",
            title = escape_xml(&format!("{} - Community {community}", self.config.title_prefix)),
            link = escape_xml(&format!("{}/community/{community}", self.site())),
            description = escape_xml(&self.config.description),
            language = escape_xml(&self.config.language),
            built = http_date(now),
        )
    }
}
