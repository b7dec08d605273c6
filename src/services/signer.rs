// src/services/signer.rs

//! Request signing for the feed API.
//!
//! Every call carries two extra query parameters: `wmsgpad`, the request
//! time in Unix milliseconds, and `wmd`, a Base64 HMAC-SHA1 over the
//! (possibly truncated) path and query concatenated with that timestamp.
//! The server recomputes the same value, so the canonical query order,
//! the truncation point and the pad encoding must match it exactly.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::form_urlencoded;

use crate::error::{AppError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Longest prefix of `path + query` covered by the signature.
pub const MAX_SIGNED_LEN: usize = 255;

/// Produces signed request URLs for one base URL and secret.
#[derive(Clone)]
pub struct RequestSigner {
    base_url: String,
    mac: HmacSha1,
}

impl RequestSigner {
    /// Create a signer. An empty secret is a configuration error.
    pub fn new(base_url: impl Into<String>, secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(AppError::config("signing secret is empty"));
        }
        let mac = HmacSha1::new_from_slice(secret)
            .map_err(|e| AppError::config(format!("invalid signing secret: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mac,
        })
    }

    /// Sign a request at the current wall-clock time.
    pub fn sign_now<I, K, V>(&self, path: &str, params: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.sign(path, params, Utc::now())
    }

    /// Sign a request at a given time.
    ///
    /// Identical inputs produce identical URLs; the input order of `params`
    /// does not matter.
    pub fn sign<I, K, V>(&self, path: &str, params: I, now: DateTime<Utc>) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let path = if path.ends_with('?') {
            path.to_string()
        } else {
            format!("{path}?")
        };

        let query = encode_sorted(params);
        let candidate = format!("{path}{query}");
        let wmsgpad = now.timestamp_millis().to_string();
        let wmd = self.digest(truncate_chars(&candidate, MAX_SIGNED_LEN), &wmsgpad);

        format!(
            "{}{}&wmsgpad={}&wmd={}",
            self.base_url,
            candidate,
            wmsgpad,
            urlencoding::encode(&wmd)
        )
    }

    /// Base64(HMAC-SHA1(secret, message + pad)).
    fn digest(&self, message: &str, pad: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(message.as_bytes());
        mac.update(pad.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Form-encode parameters ordered by raw key.
fn encode_sorted<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let sorted: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect();

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(sorted.iter())
        .finish()
}

/// First `max` characters of `s`.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const BASE: &str = "https://api.example.com/wevweb";
    const SECRET: &[u8] = b"secret-key";
    const APP_ID: &str = "be4d79eb8fc7bd008ee82c8ec4ff6fd4";

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn signer() -> RequestSigner {
        RequestSigner::new(BASE, SECRET).unwrap()
    }

    fn wmd_of(url: &str) -> &str {
        url.rsplit_once("&wmd=").unwrap().1
    }

    fn detail_params() -> Vec<(&'static str, &'static str)> {
        vec![
            ("wpf", "pc"),
            ("appId", APP_ID),
            ("os", "WEB"),
            ("fieldSet", "noticeV1"),
            ("platform", "WEB"),
            ("language", "ko"),
        ]
    }

    #[test]
    fn test_detail_fixture() {
        let url = signer().sign(
            "/notice/v1.0/notice-12345",
            detail_params(),
            at(1_700_000_000_000),
        );
        assert_eq!(
            url,
            "https://api.example.com/wevweb/notice/v1.0/notice-12345?\
             appId=be4d79eb8fc7bd008ee82c8ec4ff6fd4&fieldSet=noticeV1&language=ko\
             &os=WEB&platform=WEB&wpf=pc&wmsgpad=1700000000000\
             &wmd=JHyEsV2y%2BuKTW4%2Bfh0AoiWJrchA%3D"
        );
    }

    #[test]
    fn test_list_fixture_encodes_field_selector() {
        let params = [
            ("appId", APP_ID),
            ("fields", "notices.fieldSet(noticesV1).limit(10).pageNo(1)"),
            ("language", "ko"),
            ("os", "WEB"),
            ("pagingType", "PAGE_NO"),
            ("platform", "WEB"),
            ("wpf", "pc"),
        ];
        let url = signer().sign(
            "/community/v1.0/community-240/NOTICE/tabContent?",
            params,
            at(1_700_000_000_000),
        );
        assert!(url.starts_with(
            "https://api.example.com/wevweb/community/v1.0/community-240/NOTICE/tabContent?\
             appId=be4d79eb8fc7bd008ee82c8ec4ff6fd4\
             &fields=notices.fieldSet%28noticesV1%29.limit%2810%29.pageNo%281%29&"
        ));
        assert_eq!(wmd_of(&url), "OTuPB%2BzuL62eNQJfpaXiTEbDAJE%3D");
    }

    #[test]
    fn test_deterministic_for_same_time() {
        let s = signer();
        let a = s.sign("/notice/v1.0/notice-1", detail_params(), at(1_000));
        let b = s.sign("/notice/v1.0/notice-1", detail_params(), at(1_000));
        assert_eq!(a, b);
    }

    #[test]
    fn test_time_changes_only_pad_and_digest() {
        let s = signer();
        let a = s.sign("/notice/v1.0/notice-1", detail_params(), at(1_000));
        let b = s.sign("/notice/v1.0/notice-1", detail_params(), at(2_000));

        let (prefix_a, _) = a.split_once("&wmsgpad=").unwrap();
        let (prefix_b, _) = b.split_once("&wmsgpad=").unwrap();
        assert_eq!(prefix_a, prefix_b);
        assert_ne!(wmd_of(&a), wmd_of(&b));
        assert!(b.contains("&wmsgpad=2000&"));
    }

    #[test]
    fn test_param_order_is_irrelevant() {
        let s = signer();
        let mut reversed = detail_params();
        reversed.reverse();
        let a = s.sign("/notice/v1.0/notice-1", detail_params(), at(5));
        let b = s.sign("/notice/v1.0/notice-1", reversed, at(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_trailing_question_mark_is_optional() {
        let s = signer();
        let a = s.sign("/notice/v1.0/notice-1", detail_params(), at(5));
        let b = s.sign("/notice/v1.0/notice-1?", detail_params(), at(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_exactly_255_chars_is_signed_whole() {
        // "/x?" + "q=" + 250 chars = 255
        let s = signer();
        let exact = "a".repeat(250);
        let shorter = "a".repeat(249);
        let a = s.sign("/x", [("q", exact.as_str())], at(1_700_000_000_000));
        let b = s.sign("/x", [("q", shorter.as_str())], at(1_700_000_000_000));
        assert_ne!(wmd_of(&a), wmd_of(&b));
    }

    #[test]
    fn test_256_chars_is_truncated_before_hashing() {
        let s = signer();
        let exact = "a".repeat(250);
        let over = "a".repeat(251);
        let a = s.sign("/x", [("q", exact.as_str())], at(1_700_000_000_000));
        let b = s.sign("/x", [("q", over.as_str())], at(1_700_000_000_000));

        // Same signed prefix, different URLs.
        assert_eq!(wmd_of(&a), wmd_of(&b));
        assert_ne!(a, b);
        assert!(b.contains(&format!("q={over}&wmsgpad=")));
    }

    #[test]
    fn test_long_query_fixture() {
        let long = "a".repeat(300);
        let url = signer().sign("/x", [("q", long.as_str())], at(1_700_000_000_000));
        assert_eq!(wmd_of(&url), "FYURooAs5KYmmW%2F1z9I8H8cwOKY%3D");
    }

    #[test]
    fn test_form_encoding_uses_plus_for_space() {
        assert_eq!(encode_sorted([("k", "a b"), ("a", "x&y")]), "a=x%26y&k=a+b");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("가나다라", 2), "가나");
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            RequestSigner::new(BASE, b""),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let s = RequestSigner::new(format!("{BASE}/"), SECRET).unwrap();
        let url = s.sign("/notice/v1.0/notice-12345", detail_params(), at(1_700_000_000_000));
        assert!(url.starts_with("https://api.example.com/wevweb/notice/"));
    }
}
