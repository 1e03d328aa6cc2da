//! End-to-end run: segment → fetch → aggregate → convert → export.
//!
//! Segments are fetched one after another; the first failure aborts the run
//! before anything is written, so a partial year never lands on disk.

use crate::config::{AppConfig, MAX_SEGMENT_DAYS};
use crate::errors::AppError;
use crate::models::{AuthContext, RawSleepRecord};
use crate::services::export::{load_raw_json, write_raw_json, write_table};
use crate::services::garmin::SleepClient;
use crate::services::night::{aggregate, convert};
use crate::services::segment::segment;

/// What a run produced, for the final log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub segments_fetched: usize,
    pub records: usize,
    pub nights_written: usize,
    /// Nights lacking a bed or wake time.
    pub incomplete_nights: usize,
}

/// Fetch every segment of `[start_date, end_date]` in order.
pub async fn fetch_all(
    config: &AppConfig,
    client: &SleepClient,
    auth: &AuthContext,
) -> Result<(usize, Vec<RawSleepRecord>), AppError> {
    let mut per_segment = Vec::new();
    for range in segment(config.start_date, config.end_date, MAX_SEGMENT_DAYS)? {
        tracing::info!(
            "Getting data for period: [{}, {}] ({} days)",
            range.start,
            range.end,
            range.span_days()
        );
        let records = client.fetch(&range, auth).await?;
        tracing::debug!("{} records for [{}, {}]", records.len(), range.start, range.end);
        per_segment.push(records);
    }
    let segments_fetched = per_segment.len();
    Ok((segments_fetched, aggregate(per_segment)))
}

/// Fetch from the service, then write both artifacts.
pub async fn run(
    config: &AppConfig,
    client: &SleepClient,
    auth: &AuthContext,
) -> Result<RunSummary, AppError> {
    let (segments_fetched, records) = fetch_all(config, client, auth).await?;

    // Convert before writing anything so a malformed record leaves no artifacts.
    let nights = convert(&records, &config.reference_tz)?;

    write_raw_json(&config.raw_json_path(), &records)?;
    tracing::info!(
        "Wrote {} raw records to {}",
        records.len(),
        config.raw_json_path().display()
    );

    export_nights(config, segments_fetched, records.len(), nights)
}

/// Convert a previously saved raw dump without touching the network.
pub fn run_offline(config: &AppConfig, raw_input: &std::path::Path) -> Result<RunSummary, AppError> {
    let records = load_raw_json(raw_input)?;
    tracing::info!("Loaded {} raw records from {}", records.len(), raw_input.display());
    let nights = convert(&records, &config.reference_tz)?;
    export_nights(config, 0, records.len(), nights)
}

fn export_nights(
    config: &AppConfig,
    segments_fetched: usize,
    records: usize,
    nights: Vec<crate::models::Night>,
) -> Result<RunSummary, AppError> {
    write_table(&config.table_path(), &nights, config.delimiter.as_char())?;
    tracing::info!(
        "Wrote {} nights to {}",
        nights.len(),
        config.table_path().display()
    );

    Ok(RunSummary {
        segments_fetched,
        records,
        nights_written: nights.len(),
        incomplete_nights: nights.iter().filter(|n| n.is_incomplete()).count(),
    })
}
