//! Url Redaction
//!
//! Install urls can carry signed tokens or basic-auth credentials. These are
//! scrubbed before a url is written to a log line or an error message.

use regex::Regex;
use std::sync::LazyLock;

static USERINFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z][a-z0-9+.\-]*://)[^/@\s]+@").unwrap());
static SECRET_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([?&](?:token|key|api_key|apikey|signature|sig|auth|access_token|password)=)[^&#\s]*")
        .unwrap()
});

/// Strips credentials from a url.
pub fn redact_url(input: &str) -> String {
    let redacted = USERINFO_RE.replace(input, "${1}[REDACTED]@");
    SECRET_PARAM_RE
        .replace_all(&redacted, "${1}[REDACTED]")
        .into_owned()
}
