//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variables that override file configuration.
pub mod env_keys {
    pub const APP_ID: &str = "APP_ID";
    pub const HMAC_KEY: &str = "HMAC_KEY";
    pub const WEBHOOK_URL: &str = "WEBHOOK_URL";
    pub const COMMUNITY_ID: &str = "COMMUNITY_ID";
    pub const TAB_KEY: &str = "TAB_KEY";
    pub const RSS_LIMIT: &str = "RSS_LIMIT";
}

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API identity and signing settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Which board and tab to poll
    #[serde(default)]
    pub board: BoardConfig,

    /// HTTP client behavior and impersonation headers
    #[serde(default)]
    pub http: HttpConfig,

    /// Chat webhook sink settings
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// RSS generator settings
    #[serde(default)]
    pub rss: RssConfig,

    /// Local file locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(app_id) = non_empty(env_keys::APP_ID) {
            self.api.app_id = app_id;
        }
        if let Some(key) = non_empty(env_keys::HMAC_KEY) {
            self.api.hmac_key = key;
        }
        if let Some(url) = non_empty(env_keys::WEBHOOK_URL) {
            self.webhook.url = Some(url);
        }
        if let Some(id) = non_empty(env_keys::COMMUNITY_ID) {
            self.board.community_id = id;
        }
        if let Some(tab) = non_empty(env_keys::TAB_KEY) {
            self.board.tab_key = tab;
        }
        if let Some(limit) = non_empty(env_keys::RSS_LIMIT) {
            self.rss.limit = parse_or_keep(env_keys::RSS_LIMIT, &limit, self.rss.limit);
        }
    }

    /// Validate configuration values for basic sanity.
    ///
    /// A missing application id or signing secret is reported as a
    /// configuration error so callers can fail before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.api.app_id.trim().is_empty() {
            return Err(AppError::config(format!(
                "api.app_id is not set (set {} or api.app_id)",
                env_keys::APP_ID
            )));
        }
        if self.api.hmac_key.is_empty() {
            return Err(AppError::config(format!(
                "api.hmac_key is not set (set {} or api.hmac_key)",
                env_keys::HMAC_KEY
            )));
        }
        url::Url::parse(&self.api.base_url)?;
        if self.board.community_id.trim().is_empty() {
            return Err(AppError::validation("board.community_id is empty"));
        }
        if self.board.tab_key.trim().is_empty() {
            return Err(AppError::validation("board.tab_key is empty"));
        }
        if self.board.limit == 0 {
            return Err(AppError::validation("board.limit must be > 0"));
        }
        if self.rss.limit == 0 {
            return Err(AppError::validation("rss.limit must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if let Some(url) = &self.webhook.url {
            url::Url::parse(url)?;
        }
        Ok(())
    }
}

fn parse_or_keep<T>(key: &str, raw: &str, current: T) -> T
where
    T: FromStr + fmt::Display,
{
    raw.trim().parse().unwrap_or_else(|_| {
        log::warn!("Invalid value of the {key} environment variable, keeping {current}");
        current
    })
}

/// Remote API identity and request signing settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every signed path is appended to
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Application identifier sent as `appId`
    #[serde(default)]
    pub app_id: String,

    /// Shared HMAC signing secret
    #[serde(default)]
    pub hmac_key: String,

    #[serde(default = "defaults::language")]
    pub language: String,

    #[serde(default = "defaults::os")]
    pub os: String,

    #[serde(default = "defaults::platform")]
    pub platform: String,

    #[serde(default = "defaults::wpf")]
    pub wpf: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            app_id: String::new(),
            hmac_key: String::new(),
            language: defaults::language(),
            os: defaults::os(),
            platform: defaults::platform(),
            wpf: defaults::wpf(),
        }
    }
}

// The signing secret never ends up in logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("hmac_key", &"<redacted>")
            .field("language", &self.language)
            .field("os", &self.os)
            .field("platform", &self.platform)
            .field("wpf", &self.wpf)
            .finish()
    }
}

/// Board selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Community (board) identifier
    #[serde(default = "defaults::community_id")]
    pub community_id: String,

    /// Tab / category key within the community
    #[serde(default = "defaults::tab_key")]
    pub tab_key: String,

    /// Page size requested from the list endpoint
    #[serde(default = "defaults::limit")]
    pub limit: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            community_id: defaults::community_id(),
            tab_key: defaults::tab_key(),
            limit: defaults::limit(),
        }
    }
}

/// HTTP client settings, including the fixed headers the API expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    #[serde(default = "defaults::origin")]
    pub origin: String,

    #[serde(default = "defaults::referer")]
    pub referer: String,

    #[serde(default = "defaults::device_id")]
    pub device_id: String,

    #[serde(default = "defaults::timezone")]
    pub timezone: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            origin: defaults::origin(),
            referer: defaults::referer(),
            device_id: defaults::device_id(),
            timezone: defaults::timezone(),
        }
    }
}

/// Chat webhook sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Destination URL; the sink is disabled when absent
    #[serde(default)]
    pub url: Option<String>,

    /// Prefix of the plain-text message content
    #[serde(default = "defaults::content_prefix")]
    pub content_prefix: String,

    /// Mention appended to the message content (empty for none)
    #[serde(default = "defaults::mention")]
    pub mention: String,

    /// Embed colour as a 24-bit RGB integer
    #[serde(default = "defaults::color")]
    pub color: u32,

    /// Description length limit in characters
    #[serde(default = "defaults::max_description_chars")]
    pub max_description_chars: usize,

    /// Maximum number of images rendered per notice
    #[serde(default = "defaults::max_images")]
    pub max_images: usize,

    /// Link used when a notice has no share URL
    #[serde(default = "defaults::fallback_url")]
    pub fallback_url: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            content_prefix: defaults::content_prefix(),
            mention: defaults::mention(),
            color: defaults::color(),
            max_description_chars: defaults::max_description_chars(),
            max_images: defaults::max_images(),
            fallback_url: defaults::fallback_url(),
        }
    }
}

/// RSS generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssConfig {
    /// Number of notices rendered into the feed
    #[serde(default = "defaults::rss_limit")]
    pub limit: u32,

    /// Output file for the rendered feed
    #[serde(default = "defaults::rss_output")]
    pub output_path: PathBuf,

    /// Public site used for channel and fallback item links
    #[serde(default = "defaults::site_url")]
    pub site_url: String,

    #[serde(default = "defaults::rss_title_prefix")]
    pub title_prefix: String,

    #[serde(default = "defaults::rss_description")]
    pub description: String,

    #[serde(default = "defaults::language")]
    pub language: String,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            limit: defaults::rss_limit(),
            output_path: defaults::rss_output(),
            site_url: defaults::site_url(),
            title_prefix: defaults::rss_title_prefix(),
            description: defaults::rss_description(),
            language: defaults::language(),
        }
    }
}

/// Local file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Progress marker file
    #[serde(default = "defaults::progress_file")]
    pub progress_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            progress_file: defaults::progress_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // API defaults
    pub fn base_url() -> String {
        "https://global.apis.naver.com/weverse/wevweb".into()
    }
    pub fn language() -> String {
        "ko".into()
    }
    pub fn os() -> String {
        "WEB".into()
    }
    pub fn platform() -> String {
        "WEB".into()
    }
    pub fn wpf() -> String {
        "pc".into()
    }

    // Board defaults
    pub fn community_id() -> String {
        "240".into()
    }
    pub fn tab_key() -> String {
        "NOTICE".into()
    }
    pub fn limit() -> u32 {
        10
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64; rv:140.0) Gecko/20100101 Firefox/140.0".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn origin() -> String {
        "https://weverse.io".into()
    }
    pub fn referer() -> String {
        "https://weverse.io/".into()
    }
    pub fn device_id() -> String {
        "1".into()
    }
    pub fn timezone() -> String {
        "Asia/Seoul".into()
    }

    // Webhook defaults
    pub fn content_prefix() -> String {
        "Weverse Notice".into()
    }
    pub fn mention() -> String {
        "@everyone".into()
    }
    pub fn color() -> u32 {
        0x8daace
    }
    pub fn max_description_chars() -> usize {
        500
    }
    pub fn max_images() -> usize {
        4
    }
    pub fn fallback_url() -> String {
        "https://weverse.io/".into()
    }

    // RSS defaults
    pub fn rss_limit() -> u32 {
        20
    }
    pub fn rss_output() -> PathBuf {
        PathBuf::from("public/rss.xml")
    }
    pub fn site_url() -> String {
        "https://weverse.io".into()
    }
    pub fn rss_title_prefix() -> String {
        "Weverse Notices".into()
    }
    pub fn rss_description() -> String {
        "최근 Weverse 공지사항 RSS".into()
    }

    // Path defaults
    pub fn progress_file() -> PathBuf {
        PathBuf::from("state.json")
    }
}
