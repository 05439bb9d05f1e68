//! Channel handle parsing.
//!
//! Two-phase by design: `parse_channel_handle` is permissive (a 2-character
//! `@ab` parses fine), `is_valid_handle` is the strict gate applied before a
//! submission is allowed.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[A-Za-z0-9._-]{3,30}$").expect("handle pattern compiles"));

fn is_youtube_host(host: &str) -> bool {
    host == "youtube.com" || host.ends_with(".youtube.com")
}

/// Canonicalize free-form input (bare handle or URL) into an `@handle`.
/// Returns `None` when no handle can be read out of the input.
pub fn parse_channel_handle(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if value.starts_with('@') {
        return Some(value.to_string());
    }

    let lowered = value.to_ascii_lowercase();
    let normalized = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        value.to_string()
    } else {
        format!("https://{value}")
    };

    let parsed = Url::parse(&normalized).ok()?;
    if !is_youtube_host(parsed.host_str()?) {
        return None;
    }

    parsed
        .path_segments()?
        .find(|segment| segment.starts_with('@'))
        .map(str::to_string)
}

/// Strict validity gate: `@` followed by 3-30 of letters, digits, `.`, `_`, `-`.
pub fn is_valid_handle(handle: &str) -> bool {
    HANDLE_PATTERN.is_match(handle)
}
