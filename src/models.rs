use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::AppError;

/// An inclusive span of calendar dates queried in a single upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, counting both ends.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Authenticated request material captured from a logged-in browser session.
/// Built once per run and shared by reference across every fetch.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Lower-case header name → value, sent verbatim with every request.
    pub headers: BTreeMap<String, String>,
    /// Numeric session id, sent as the `_` query parameter.
    pub session_token: String,
}

/// One night exactly as `dailySleepsByDate` returned it.
///
/// The JSON is kept untouched (key order included) so the raw artifact is
/// written back verbatim; [`RawSleepRecord::fields`] reads the typed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSleepRecord(pub serde_json::Value);

/// The fields of a [`RawSleepRecord`] the converter reads. Absent and `null`
/// are both `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepFields {
    #[serde(default)]
    pub calendar_date: Option<String>,
    #[serde(default, rename = "sleepStartTimestampGMT")]
    pub sleep_start_timestamp_gmt: Option<i64>,
    #[serde(default, rename = "sleepEndTimestampGMT")]
    pub sleep_end_timestamp_gmt: Option<i64>,
    #[serde(default)]
    pub deep_sleep_seconds: Option<i64>,
    #[serde(default)]
    pub light_sleep_seconds: Option<i64>,
    #[serde(default)]
    pub sleep_time_seconds: Option<i64>,
    #[serde(default)]
    pub awake_sleep_seconds: Option<i64>,
    #[serde(default)]
    pub nap_time_seconds: Option<i64>,
    #[serde(default)]
    pub sleep_window_confirmed: Option<bool>,
}

impl RawSleepRecord {
    /// Typed view of the record. A non-object or a wrongly typed field is a
    /// malformed record.
    pub fn fields(&self) -> Result<SleepFields, AppError> {
        SleepFields::deserialize(&self.0).map_err(|e| AppError::MalformedRecord(e.to_string()))
    }
}

/// A sleep session keyed by the evening it began.
#[derive(Debug, Clone, PartialEq)]
pub struct Night {
    pub previous_day: NaiveDate,
    pub bed_time: Option<DateTime<Tz>>,
    pub wake_time: Option<DateTime<Tz>>,
    pub deep_duration: Option<Duration>,
    pub light_duration: Option<Duration>,
    pub total_duration: Option<Duration>,
    pub awake_duration: Option<Duration>,
    pub nap_duration: Option<Duration>,
    pub window_confirmed: bool,
}

impl Night {
    /// True when the service omitted either end of the sleep window.
    pub fn is_incomplete(&self) -> bool {
        self.bed_time.is_none() || self.wake_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_days_inclusive() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2017, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2017, 4, 1).unwrap(),
        };
        assert_eq!(range.span_days(), 32);
    }

    #[test]
    fn test_fields_reads_camel_case() {
        let record = RawSleepRecord(serde_json::json!({
            "calendarDate": "2023-06-15",
            "sleepStartTimestampGMT": 1686862800000_i64,
            "sleepEndTimestampGMT": null,
            "deepSleepSeconds": 3600,
            "sleepWindowConfirmed": true,
            "sleepQualityTypePK": null,
            "userProfilePK": 1234
        }));
        let fields = record.fields().unwrap();
        assert_eq!(fields.calendar_date.as_deref(), Some("2023-06-15"));
        assert_eq!(fields.sleep_start_timestamp_gmt, Some(1686862800000));
        assert_eq!(fields.sleep_end_timestamp_gmt, None);
        assert_eq!(fields.deep_sleep_seconds, Some(3600));
        assert_eq!(fields.light_sleep_seconds, None);
        assert_eq!(fields.sleep_window_confirmed, Some(true));
    }

    #[test]
    fn test_fields_rejects_wrong_types() {
        let record = RawSleepRecord(serde_json::json!({"sleepTimeSeconds": "eight hours"}));
        assert!(matches!(record.fields(), Err(AppError::MalformedRecord(_))));

        let record = RawSleepRecord(serde_json::json!([1, 2]));
        assert!(matches!(record.fields(), Err(AppError::MalformedRecord(_))));
    }

    #[test]
    fn test_raw_record_serializes_verbatim() {
        let text = r#"{"calendarDate":"2023-06-15","zeta":1,"alpha":2}"#;
        let record: RawSleepRecord = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), text);
    }
}
