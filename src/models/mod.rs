// src/models/mod.rs

//! Domain models for the relay.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod notice;
mod progress;

// Re-export all public types
pub use config::{
    ApiConfig, BoardConfig, Config, HttpConfig, PathsConfig, RssConfig, WebhookConfig, env_keys,
};
pub use notice::{Attachment, DispatchNotice, NoticeDetail, NoticeSummary, Photo};
pub use progress::ProgressMarker;
