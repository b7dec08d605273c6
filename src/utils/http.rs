// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

const ACCEPT_JSON: &str = "application/json, text/plain, */*";

/// Create a configured asynchronous HTTP client.
///
/// Every request carries the browser-like headers the feed API requires.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(default_headers(config)?)
        .build()?;
    Ok(client)
}

/// Fixed impersonation headers.
pub fn default_headers(config: &HttpConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
    headers.insert(REFERER, header_value("Referer", &config.referer)?);
    headers.insert(ORIGIN, header_value("Origin", &config.origin)?);
    headers.insert(
        HeaderName::from_static("wev-device-id"),
        header_value("WEV-device-Id", &config.device_id)?,
    );
    headers.insert(
        HeaderName::from_static("wev-wdm-v2"),
        HeaderValue::from_static("off"),
    );
    headers.insert(
        HeaderName::from_static("wev-open-community"),
        HeaderValue::from_static("A"),
    );
    headers.insert(
        HeaderName::from_static("wev-timezone-id"),
        header_value("WEV-timezone-id", &config.timezone)?,
    );
    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::config(format!("invalid {name} header value '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let headers = default_headers(&HttpConfig::default()).unwrap();
        assert_eq!(headers.get(ORIGIN).unwrap(), "https://weverse.io");
        assert_eq!(headers.get(REFERER).unwrap(), "https://weverse.io/");
        assert_eq!(headers.get("wev-timezone-id").unwrap(), "Asia/Seoul");
        assert_eq!(headers.get("wev-device-id").unwrap(), "1");
    }

    #[test]
    fn test_rejects_invalid_header_value() {
        let config = HttpConfig {
            origin: "bad\nvalue".to_string(),
            ..HttpConfig::default()
        };
        assert!(matches!(
            default_headers(&config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_create_client() {
        assert!(create_async_client(&HttpConfig::default()).is_ok());
    }
}
