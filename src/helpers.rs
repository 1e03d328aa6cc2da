//! Shared helpers for the nullable values the wellness service sends.
//!
//! The service leaves timestamps and durations `null` for nights it could not
//! fully measure, so every conversion here is `Option` in, `Option` out:
//!
//! - `opt_millis_to_instant`: epoch milliseconds → instant in a reference zone
//! - `opt_secs_to_duration`: whole seconds → `Duration`
//!
//! The `format_*` helpers render those values for the tabular export, with
//! `None` rendered as an empty cell.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::AppError;

/// Decode an epoch-millisecond timestamp and express it in `tz`.
///
/// `None` passes through. A value outside chrono's representable range is a
/// malformed record rather than a silent null.
pub(crate) fn opt_millis_to_instant(
    millis: Option<i64>,
    tz: &Tz,
) -> Result<Option<DateTime<Tz>>, AppError> {
    millis
        .map(|ms| {
            DateTime::<Utc>::from_timestamp_millis(ms)
                .map(|utc| utc.with_timezone(tz))
                .ok_or_else(|| {
                    AppError::MalformedRecord(format!("timestamp {} out of range", ms))
                })
        })
        .transpose()
}

/// Convert optional whole seconds to a `Duration`.
///
/// `None` passes through; a count beyond `Duration`'s range is malformed.
pub(crate) fn opt_secs_to_duration(secs: Option<i64>) -> Result<Option<Duration>, AppError> {
    secs.map(|s| {
        Duration::try_seconds(s)
            .ok_or_else(|| AppError::MalformedRecord(format!("duration {}s out of range", s)))
    })
    .transpose()
}

/// Parse a zero-padded `YYYY-MM-DD` date. chrono accepts `2023-6-5` for this
/// format, so the width is checked first.
pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `2023-06-16 00:00:00+03:00`, or empty.
pub(crate) fn format_instant<T: TimeZone>(dt: Option<&DateTime<T>>) -> String
where
    T::Offset: std::fmt::Display,
{
    dt.map(|d| d.format("%Y-%m-%d %H:%M:%S%:z").to_string())
        .unwrap_or_default()
}

/// `H:MM:SS` with hours unbounded (naps and long nights can exceed a day), or empty.
pub(crate) fn format_duration(d: Option<Duration>) -> String {
    match d {
        Some(d) => {
            let total = d.num_seconds();
            let sign = if total < 0 { "-" } else { "" };
            let total = total.abs();
            format!(
                "{}{}:{:02}:{:02}",
                sign,
                total / 3600,
                (total % 3600) / 60,
                total % 60
            )
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tallinn() -> Tz {
        "Europe/Tallinn".parse().unwrap()
    }

    #[test]
    fn test_opt_millis_to_instant_none() {
        assert_eq!(opt_millis_to_instant(None, &tallinn()).unwrap(), None);
    }

    #[test]
    fn test_opt_millis_to_instant_converts_zone() {
        // 2023-06-15T21:00:00Z is midnight in Tallinn (EEST, +03:00)
        let dt = opt_millis_to_instant(Some(1686862800000), &tallinn())
            .unwrap()
            .unwrap();
        assert_eq!(dt.to_rfc3339(), "2023-06-16T00:00:00+03:00");
        assert_eq!(dt.timestamp_millis(), 1686862800000);
    }

    #[test]
    fn test_opt_millis_to_instant_out_of_range() {
        let err = opt_millis_to_instant(Some(i64::MAX), &tallinn()).unwrap_err();
        assert!(matches!(err, AppError::MalformedRecord(_)));
    }

    #[test]
    fn test_opt_secs_to_duration() {
        assert_eq!(opt_secs_to_duration(None).unwrap(), None);
        assert_eq!(
            opt_secs_to_duration(Some(28800)).unwrap(),
            Some(Duration::hours(8))
        );
    }

    #[test]
    fn test_opt_secs_to_duration_out_of_range() {
        let err = opt_secs_to_duration(Some(9_300_000_000_000_000)).unwrap_err();
        assert!(matches!(err, AppError::MalformedRecord(_)));
        assert!(opt_secs_to_duration(Some(i64::MIN)).is_err());
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2023-06-15"),
            NaiveDate::from_ymd_opt(2023, 6, 15)
        );
        assert_eq!(parse_iso_date("15/06/2023"), None);
        assert_eq!(parse_iso_date("2023-6-15"), None);
        assert_eq!(parse_iso_date("2023-06-5"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn test_format_instant() {
        let dt = opt_millis_to_instant(Some(1686891600000), &tallinn()).unwrap();
        assert_eq!(format_instant(dt.as_ref()), "2023-06-16 08:00:00+03:00");
        assert_eq!(format_instant::<Tz>(None), "");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some(Duration::seconds(600))), "0:10:00");
        assert_eq!(format_duration(Some(Duration::seconds(28861))), "8:01:01");
        assert_eq!(format_duration(Some(Duration::hours(26))), "26:00:00");
        assert_eq!(format_duration(None), "");
    }
}
