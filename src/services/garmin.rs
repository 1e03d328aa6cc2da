//! Garmin Connect wellness-service client.
//!
//! Fetches `dailySleepsByDate` for one date segment per call. The endpoint is
//! private to the Connect web app: it only answers requests that carry the
//! cookies and browser headers of a signed-in session (see [`AuthContext`]).

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING};
use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;
use crate::models::{AuthContext, DateRange, RawSleepRecord};

/// Longest stretch of an unparseable error body echoed back to the operator.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Client for the sleep JSON endpoint.
#[derive(Debug, Clone)]
pub struct SleepClient {
    client: reqwest::Client,
    url: String,
}

/// Error payload the service sends with non-200 responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl SleepClient {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, AppError> {
        // gzip/deflate/brotli decoding is enabled through crate features; the
        // client advertises exactly the encodings it can undo.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Fetch the sleep records for every date in `range`.
    ///
    /// A non-success status is returned as [`AppError::Upstream`] with the
    /// service's own message; nothing from that response is kept.
    pub async fn fetch(
        &self,
        range: &DateRange,
        auth: &AuthContext,
    ) -> Result<Vec<RawSleepRecord>, AppError> {
        let start = range.start.format("%Y-%m-%d").to_string();
        let end = range.end.format("%Y-%m-%d").to_string();

        tracing::debug!("GET {} startDate={} endDate={}", self.url, start, end);

        let response = self
            .client
            .get(&self.url)
            .headers(build_headers(auth)?)
            .query(&[
                ("startDate", start.as_str()),
                ("endDate", end.as_str()),
                ("_", auth.session_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();

        // Decoding failures (corrupt gzip/brotli stream) surface here.
        let body = response.bytes().await.map_err(|e| AppError::Upstream {
            status: status.as_u16(),
            message: format!("could not read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| AppError::Upstream {
            status: status.as_u16(),
            message: format!("response is not a JSON array of sleep records: {}", e),
        })
    }
}

/// Turn the captured headers into a `HeaderMap`.
///
/// `accept-encoding` is left to the client: a browser advertises encodings
/// (zstd, sdch) this client may not be able to decode.
fn build_headers(auth: &AuthContext) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &auth.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Auth(format!("invalid header name '{}': {}", name, e)))?;
        if name == ACCEPT_ENCODING {
            continue;
        }
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Auth(format!("invalid value for header '{}': {}", name.as_str(), e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// The service's `message` field, or the raw body when it isn't JSON.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
        }) => message,
        _ => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            if text.is_empty() {
                "<empty body>".to_string()
            } else {
                text.chars().take(MAX_ERROR_BODY_CHARS).collect()
            }
        }
    }
}
