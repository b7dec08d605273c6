//! Service layer for the relay.
//!
//! This module contains the business logic for:
//! - Request signing (`RequestSigner`)
//! - Feed API access (`FeedClient`, `NoticeSource`)
//! - Notice dispatch (`NoticeSink`, `WebhookSink`, `LogSink`)
//! - RSS rendering (`RssRenderer`)

mod feed;
mod rss;
mod signer;
mod sink;
mod webhook;

pub use feed::{FeedClient, NoticeSource, parse_detail, parse_tab_content};
pub use rss::{RssRenderer, escape_xml};
pub use signer::{MAX_SIGNED_LEN, RequestSigner};
pub use sink::{LogSink, NoticeSink};
pub use webhook::{Embed, EmbedImage, WebhookPayload, WebhookSink, build_payload};
