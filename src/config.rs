use chrono::{Duration, Local, NaiveDate};
use chrono_tz::Tz;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::helpers::parse_iso_date;

/// Garmin rejects `dailySleepsByDate` queries spanning more than 32 days.
pub const MAX_SEGMENT_DAYS: i64 = 32;

const DEFAULT_START_DATE: &str = "2017-03-01";
const DEFAULT_SLEEP_API_URL: &str =
    "https://connect.garmin.com/modern/proxy/wellness-service/wellness/dailySleepsByDate";
const DEFAULT_SLEEP_PAGE_URL: &str = "https://connect.garmin.com/modern/sleep/";

/// Field separator for the tabular export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory the raw JSON and the table are written to.
    pub output_dir: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Zone bed and wake times are expressed in.
    pub reference_tz: Tz,
    pub sleep_api_url: String,
    /// Sleep page base URL; the referer is this plus the start date.
    pub sleep_page_url: String,
    /// Request headers captured from an authenticated sleep-page load.
    pub auth_headers_file: PathBuf,
    /// Convert this raw JSON dump instead of fetching.
    pub raw_input: Option<PathBuf>,
    pub delimiter: Delimiter,
    /// Headless toggle for the browser that captures the headers.
    pub browser_headless: bool,
    /// Browser wait timeout; also bounds each HTTP request.
    pub browser_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let output_dir = PathBuf::from(env_or("OUTPUT_DIR", "./data"));

        let start_date = parse_date_var("START_DATE", &env_or("START_DATE", DEFAULT_START_DATE))?;
        let end_date = match std::env::var("END_DATE") {
            Ok(s) => parse_date_var("END_DATE", &s)?,
            Err(_) => Local::now().date_naive() - Duration::days(1),
        };
        if start_date > end_date {
            return Err(AppError::InvalidRange(format!(
                "START_DATE {} is after END_DATE {}",
                start_date, end_date
            )));
        }

        let tz_name = env_or("REFERENCE_TZ", "Europe/Tallinn");
        let reference_tz: Tz = tz_name
            .parse()
            .map_err(|_| AppError::Config(format!("REFERENCE_TZ '{}' is not an IANA zone", tz_name)))?;

        let auth_headers_file = std::env::var("AUTH_HEADERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| output_dir.join("request_headers.json"));

        let delimiter = match env_or("OUTPUT_DELIMITER", "comma").as_str() {
            "comma" | "," => Delimiter::Comma,
            "tab" | "\t" => Delimiter::Tab,
            other => {
                return Err(AppError::Config(format!(
                    "OUTPUT_DELIMITER must be 'comma' or 'tab', got '{}'",
                    other
                )))
            }
        };

        let browser_headless = match env_or("BROWSER_HEADLESS", "true").to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(AppError::Config(format!(
                    "BROWSER_HEADLESS must be a boolean, got '{}'",
                    other
                )))
            }
        };

        let browser_timeout_secs = env_or("BROWSER_TIMEOUT_SECS", "20")
            .parse()
            .map_err(|_| AppError::Config("BROWSER_TIMEOUT_SECS must be a whole number".to_string()))?;

        Ok(Self {
            output_dir,
            start_date,
            end_date,
            reference_tz,
            sleep_api_url: env_or("SLEEP_API_URL", DEFAULT_SLEEP_API_URL),
            sleep_page_url: env_or("SLEEP_PAGE_URL", DEFAULT_SLEEP_PAGE_URL),
            auth_headers_file,
            raw_input: std::env::var("RAW_INPUT").ok().map(PathBuf::from),
            delimiter,
            browser_headless,
            browser_timeout_secs,
        })
    }

    pub fn raw_json_path(&self) -> PathBuf {
        self.output_dir.join("sleep_data.json")
    }

    pub fn table_path(&self) -> PathBuf {
        self.output_dir.join("sleep_dataframe.csv")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_date_var(key: &str, value: &str) -> Result<NaiveDate, AppError> {
    parse_iso_date(value).ok_or_else(|| {
        AppError::InvalidRange(format!("{} '{}' is not a YYYY-MM-DD date", key, value))
    })
}
