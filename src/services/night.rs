//! Raw sleep record → [`Night`] conversion.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

use crate::errors::AppError;
use crate::helpers::{opt_millis_to_instant, opt_secs_to_duration, parse_iso_date};
use crate::models::{Night, RawSleepRecord};

/// Concatenate per-segment results in segment order. No deduplication: the
/// segmenter never produces overlapping ranges.
pub fn aggregate(segments: Vec<Vec<RawSleepRecord>>) -> Vec<RawSleepRecord> {
    segments.into_iter().flatten().collect()
}

/// Convert every record, in order. The first malformed record fails the whole
/// batch so a night never silently goes missing from the export.
pub fn convert(records: &[RawSleepRecord], tz: &Tz) -> Result<Vec<Night>, AppError> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            convert_record(record, tz).map_err(|e| match e {
                AppError::MalformedRecord(msg) => {
                    AppError::MalformedRecord(format!("record #{}: {}", i, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Convert a single record. Null timestamps and durations become `None`.
pub fn convert_record(record: &RawSleepRecord, tz: &Tz) -> Result<Night, AppError> {
    let fields = record.fields()?;
    Ok(Night {
        previous_day: previous_day(fields.calendar_date.as_deref())?,
        bed_time: opt_millis_to_instant(fields.sleep_start_timestamp_gmt, tz)?,
        wake_time: opt_millis_to_instant(fields.sleep_end_timestamp_gmt, tz)?,
        deep_duration: opt_secs_to_duration(fields.deep_sleep_seconds)?,
        light_duration: opt_secs_to_duration(fields.light_sleep_seconds)?,
        total_duration: opt_secs_to_duration(fields.sleep_time_seconds)?,
        awake_duration: opt_secs_to_duration(fields.awake_sleep_seconds)?,
        nap_duration: opt_secs_to_duration(fields.nap_time_seconds)?,
        window_confirmed: fields.sleep_window_confirmed.unwrap_or(false),
    })
}

/// A night is filed under the evening it began: the day before `calendarDate`.
fn previous_day(calendar_date: Option<&str>) -> Result<NaiveDate, AppError> {
    let raw = calendar_date
        .ok_or_else(|| AppError::MalformedRecord("missing calendarDate".to_string()))?;
    let date = parse_iso_date(raw).ok_or_else(|| {
        AppError::MalformedRecord(format!("calendarDate '{}' is not YYYY-MM-DD", raw))
    })?;
    date.checked_sub_signed(Duration::days(1))
        .ok_or_else(|| AppError::MalformedRecord(format!("calendarDate '{}' has no previous day", raw)))
}
