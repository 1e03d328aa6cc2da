// Sleep Sync v0.1
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod errors;
mod helpers;
mod models;
mod services;

use config::AppConfig;
use errors::AppError;
use services::auth::load_auth_context;
use services::garmin::SleepClient;
use services::pipeline::{self, RunSummary};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sleep_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(summary) => {
            tracing::info!(
                "Done: {} segments, {} records, {} nights ({} without bed/wake time)",
                summary.segments_fetched,
                summary.records,
                summary.nights_written,
                summary.incomplete_nights
            );
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<RunSummary, AppError> {
    let config = AppConfig::from_env()?;

    if let Some(raw_input) = &config.raw_input {
        tracing::info!("RAW_INPUT set, converting {} without fetching", raw_input.display());
        return pipeline::run_offline(&config, raw_input);
    }

    tracing::info!(
        "Pulling sleep data {} → {} (header capture: headless={}, timeout={}s)",
        config.start_date,
        config.end_date,
        config.browser_headless,
        config.browser_timeout_secs
    );

    let start = config.start_date.format("%Y-%m-%d").to_string();
    let auth = load_auth_context(&config.auth_headers_file, &config.sleep_page_url, &start)?;
    tracing::info!(
        "Loaded captured headers from {}",
        config.auth_headers_file.display()
    );

    let client = SleepClient::new(&config.sleep_api_url, config.browser_timeout_secs)?;
    pipeline::run(&config, &client, &auth).await
}
