//! Text normalization shared by every lookup rule.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::config::TIMESTAMP_OUTPUT_FORMAT;

/// Runs of whitespace, including newlines and indentation from pretty-printed markup.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// NewsML basic-format timestamp in UTC, e.g. `20240102T101500Z`.
const BASIC_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// NewsML basic-format timestamp with offset, e.g. `20240102T101500+0100`.
const BASIC_OFFSET_FORMAT: &str = "%Y%m%dT%H%M%S%z";

/// Normalize extracted text.
///
/// Composes to Unicode NFC, trims, and collapses internal whitespace runs to
/// a single space. Returns `None` when nothing but whitespace remains.
///
/// # Examples
/// ```
/// use newsml_extractor::text::normalize_text;
///
/// assert_eq!(
///     normalize_text("\n    Flooding closes\n    roads  "),
///     Some("Flooding closes roads".to_string())
/// );
/// assert_eq!(normalize_text(" \n\t "), None);
/// ```
pub fn normalize_text(text: &str) -> Option<String> {
    let composed: String = text.nfc().collect();
    let trimmed = composed.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE_RUN.replace_all(trimmed, " ").into_owned())
}

/// Split `text` on `separator` and normalize each piece, dropping empty ones.
///
/// # Examples
/// ```
/// use newsml_extractor::text::split_normalized;
///
/// assert_eq!(
///     split_normalized("Politics--Europe-- ", "--"),
///     vec!["Politics".to_string(), "Europe".to_string()]
/// );
/// ```
pub fn split_normalized(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return normalize_text(text).into_iter().collect();
    }
    text.split(separator).filter_map(normalize_text).collect()
}

/// Canonicalize a timestamp to UTC in `YYYY-MM-DDTHH:MM:SS+0000` form.
///
/// Accepts the NewsML basic formats (`20240102T101500Z`,
/// `20240102T101500+0100`) and RFC 3339. Returns `None` if the text matches
/// none of them.
pub fn canonical_timestamp(text: &str) -> Option<String> {
    let text = text.trim();

    let utc = if let Ok(naive) = NaiveDateTime::parse_from_str(text, BASIC_UTC_FORMAT) {
        naive.and_utc()
    } else if let Ok(with_offset) = DateTime::parse_from_str(text, BASIC_OFFSET_FORMAT) {
        with_offset.with_timezone(&Utc)
    } else if let Ok(rfc3339) = DateTime::parse_from_rfc3339(text) {
        rfc3339.with_timezone(&Utc)
    } else {
        return None;
    };

    Some(utc.format(TIMESTAMP_OUTPUT_FORMAT).to_string())
}
