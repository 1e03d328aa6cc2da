//! Builds an [`AuthContext`] from request headers captured in a browser.
//!
//! Signing in happens outside this crate: a browser (scripted or by hand)
//! loads `<sleep page>/<start date>` while signed in, and its request headers
//! are saved as a flat JSON object (`{"Cookie": "...", "Host": "...", ...}`).
//! Everything the wellness endpoint needs is derived from that dump.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;

use crate::errors::AppError;
use crate::models::AuthContext;

/// Captured header → header sent to the wellness endpoint.
const FORWARDED_HEADERS: [(&str, &str); 6] = [
    ("cookie", "cookie"),
    ("accept-encoding", "accept-encoding"),
    ("accept-language", "accept-language"),
    ("user-agent", "user-agent"),
    ("accept", "accept"),
    ("host", "authority"),
];

fn session_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$ses_id:(\d+)").expect("session id pattern is valid"))
}

/// Read a captured header dump from disk.
pub fn load_auth_context(
    path: &Path,
    sleep_page_url: &str,
    start_date: &str,
) -> Result<AuthContext, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::Auth(format!("cannot read captured headers {}: {}", path.display(), e))
    })?;
    let captured: HashMap<String, String> = serde_json::from_str(&text).map_err(|e| {
        AppError::Auth(format!(
            "{} is not a JSON object of header strings: {}",
            path.display(),
            e
        ))
    })?;
    auth_context_from_headers(&captured, sleep_page_url, start_date)
}

/// Build the context from captured headers (names matched case-insensitively).
pub fn auth_context_from_headers(
    captured: &HashMap<String, String>,
    sleep_page_url: &str,
    start_date: &str,
) -> Result<AuthContext, AppError> {
    let lookup: BTreeMap<String, &str> = captured
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.as_str()))
        .collect();

    let mut headers = BTreeMap::new();
    for (source, target) in FORWARDED_HEADERS {
        let value = lookup
            .get(source)
            .ok_or_else(|| AppError::Auth(format!("captured headers lack '{}'", source)))?;
        headers.insert(target.to_string(), value.to_string());
    }

    let upgrade = match lookup.get("upgrade-insecure-requests") {
        Some(v) => v.to_string(),
        None => {
            tracing::warn!("captured headers lack 'upgrade-insecure-requests', sending 1");
            "1".to_string()
        }
    };
    headers.insert("upgrade-insecure-requests".to_string(), upgrade);
    headers.insert(
        "referer".to_string(),
        format!("{}{}", sleep_page_url, start_date),
    );

    // The session cookie is the usual carrier; other headers follow in name order.
    let candidates = lookup
        .get("cookie")
        .copied()
        .into_iter()
        .chain(lookup.iter().filter(|(k, _)| *k != "cookie").map(|(_, v)| *v));
    let session_token = extract_session_token(candidates)
        .ok_or_else(|| AppError::Auth("no '$ses_id:' session marker in captured headers".to_string()))?;

    Ok(AuthContext {
        headers,
        session_token,
    })
}

/// The digits after the first `$ses_id:` marker in any of `values`.
fn extract_session_token<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let re = session_id_regex();
    values
        .filter_map(|v| re.captures(v))
        .map(|caps| caps[1].to_string())
        .next()
}
