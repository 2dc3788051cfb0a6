//! Log Redaction
//!
//! Scrubs URL credentials, bearer tokens and secret query parameters before logging.

use regex::Regex;
use std::sync::LazyLock;

static URL_USERINFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<scheme>[a-zA-Z][a-zA-Z0-9+.\-]*://)[^/@\s]+@").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static QUERY_SECRET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<key>[?&](?:key|token|api_key|apikey|access_token)=)[^&\s]+").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = URL_USERINFO_RE.replace_all(input, "${scheme}[REDACTED]@");
    let redacted = QUERY_SECRET_RE.replace_all(&redacted, "${key}[REDACTED]");
    API_KEY_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .into_owned()
}
