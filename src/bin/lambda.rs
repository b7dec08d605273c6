//! Lambda entry point for notice-relay.
//!
//! Designed to run on AWS Lambda behind a scheduled trigger; every
//! invocation performs exactly one poll cycle.
//!
//! ## Environment Variables
//!
//! - `APP_ID`, `HMAC_KEY`: API credentials (required)
//! - `WEBHOOK_URL`: chat webhook destination
//! - `COMMUNITY_ID`, `TAB_KEY`: board selection
//! - `CONFIG_PATH`: optional bundled TOML config (default: `config.toml`)
//! - `S3_BUCKET`, `S3_PROGRESS_KEY`: progress marker location
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notice_relay::error::{AppError, Result};
use notice_relay::models::Config;
use notice_relay::pipeline::{self, PollReport};
use notice_relay::storage::S3ProgressStore;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> std::result::Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("notice-relay Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}

/// Handler for scheduled events.
#[instrument(skip(event))]
async fn handler(event: LambdaEvent<Value>) -> std::result::Result<Value, LambdaError> {
    info!("Received event: {:?}", event.payload);
    respond(run_lambda_check().await)
}

/// Map a cycle result to the invocation result.
///
/// Missing configuration fails the invocation so the scheduler records it;
/// other errors are reported in the response body and retried next tick.
fn respond(result: Result<PollReport>) -> std::result::Result<Value, LambdaError> {
    match result {
        Ok(report) => {
            info!(
                "Lambda execution successful: {} notices dispatched",
                report.dispatched
            );
            Ok(serde_json::json!({ "status": "success", "report": report }))
        }
        Err(e @ AppError::Config(_)) => {
            error!("Lambda misconfigured: {}", e);
            Err(e.into())
        }
        Err(e) => {
            error!("Lambda execution failed: {}", e);
            Ok(serde_json::json!({ "status": "error", "message": e.to_string() }))
        }
    }
}

/// One poll cycle with the marker stored in S3.
async fn run_lambda_check() -> Result<PollReport> {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = Config::load_or_default(&config_path);
    config.apply_env();

    // Fail before touching S3 or the feed API.
    config.validate()?;

    let store = S3ProgressStore::from_env().await?;
    pipeline::run_check(&config, &store).await
}
