//! notice-relay CLI
//!
//! Local execution entry point, meant to be run once per scheduler tick
//! (cron, systemd timer, CI schedule). For AWS Lambda, use
//! `notice-relay-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notice_relay::{
    error::Result,
    models::Config,
    pipeline,
    storage::{LocalProgressStore, ProgressStore},
};

/// notice-relay - community notice poller
#[derive(Parser, Debug)]
#[command(
    name = "notice-relay",
    version,
    about = "Relays new community notices to webhooks and RSS"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the progress file location
    #[arg(long)]
    state: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check for new notices and dispatch them
    Check,

    /// Render the latest notices to an RSS file
    Rss {
        /// Output file (default: rss.output_path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of notices (default: rss.limit)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Validate configuration
    Validate,

    /// Show the persisted progress marker
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();
    init_logging(cli.verbose);

    if let Err(e) = dotenv {
        if !e.not_found() {
            log::warn!("Ignoring unreadable .env file: {e}");
        }
    }

    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        log::info!("No config file at {}, using defaults", cli.config.display());
        Config::default()
    };
    config.apply_env();

    if let Some(path) = cli.state {
        config.paths.progress_file = path;
    }

    let store = LocalProgressStore::new(&config.paths.progress_file);

    match cli.command {
        Command::Check => {
            let report = pipeline::run_check(&config, &store).await?;
            log::info!(
                "Check complete: fetched {}, dispatched {}, fallbacks {}, sink failures {}, marker {} -> {}",
                report.fetched,
                report.dispatched,
                report.detail_fallbacks,
                report.sink_failures,
                report.marker_before,
                report.marker_after
            );
        }

        Command::Rss { output, limit } => {
            if let Some(path) = output {
                config.rss.output_path = path;
            }
            if let Some(limit) = limit {
                config.rss.limit = limit;
            }
            if pipeline::run_rss_with_feed(&config).await?.is_none() {
                log::warn!("RSS feed not updated");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            log::info!("Progress file: {}", store.location());
            let marker = store.load().await;
            if marker.is_fresh() {
                log::info!("No notices processed yet.");
            } else {
                log::info!("Last notice ID: {}", marker.last_notice_id);
                if let Some(updated) = marker.updated_at {
                    log::info!("Last updated: {}", updated);
                }
            }
        }
    }

    Ok(())
}
