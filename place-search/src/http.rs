//! Shared HTTP client for provider, generator, and image requests.
//!
//! One [`reqwest::Client`] is built per [`crate::Pipeline`] and cloned into
//! every adapter. It carries only transport settings (timeout, User-Agent),
//! never request-level state. The client timeout is the provider budget;
//! expansion requests override it per request.

use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::SearchError;

/// User-Agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("place-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for provider API calls.
///
/// The client has:
/// - Timeout from config (the orchestrator applies its own bound on top)
/// - The configured User-Agent, or [`DEFAULT_USER_AGENT`]
/// - gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

const KEY_PARAM: &str = "key=";
const REDACTED: &str = "REDACTED";
/// Secrets shorter than this are only redacted as `key=` query values.
const MIN_RAW_SECRET_LEN: usize = 8;

/// Redact API keys from `text` so URLs that embed one can be logged.
///
/// The value of every `key=` query parameter is replaced. A `secret` long
/// enough not to collide with ordinary text is also replaced wherever it
/// appears.
pub fn redact(text: &str, secret: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find(KEY_PARAM) {
        out.push_str(&rest[..idx]);
        let is_param = out.ends_with(|c: char| c == '?' || c == '&');
        out.push_str(KEY_PARAM);
        rest = &rest[idx + KEY_PARAM.len()..];
        if is_param {
            let end = rest
                .find(|c: char| matches!(c, '&' | '#' | '"' | '\'' | ')') || c.is_whitespace())
                .unwrap_or(rest.len());
            if end > 0 {
                out.push_str(REDACTED);
            }
            rest = &rest[end..];
        }
    }
    out.push_str(rest);

    if secret.len() >= MIN_RAW_SECRET_LEN {
        out = out.replace(secret, REDACTED);
    }
    out
}
