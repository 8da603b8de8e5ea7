//! Publish-date normalization.
//!
//! Dates come from meta tags, `datetime` attributes and free text, so the
//! formats vary wildly. Anything that parses is rendered as a UTC RFC 3339
//! instant with millisecond precision; anything else passes through trimmed.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;

/// First date-shaped substring: ISO dates, US numeric dates and
/// `Month D, YYYY`, whichever occurs first in the text.
static DATE_IN_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \b\d{4}-\d{2}-\d{2}\b
        | \b\d{1,2}/\d{1,2}/\d{4}\b
        | \b\d{1,2}\.\d{1,2}\.\d{4}\b
        | \b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?\s+\d{1,2},\s*\d{4}\b
        ",
    )
    .expect("date scan pattern is valid")
});

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m.%d.%Y", "%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%d %B %Y",
];

/// Parses a date string into a UTC instant.
///
/// Zone-less values are taken as UTC; date-only values as midnight UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }

    let cleaned = raw.replace('.', "").replace(',', ", ").replace(",  ", ", ");
    for fmt in DATE_FORMATS {
        for candidate in [raw, cleaned.as_str()] {
            if let Ok(date) = NaiveDate::parse_from_str(candidate, fmt) {
                return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
            }
        }
    }

    None
}

/// Parse-or-passthrough normalization.
///
/// ```rust
/// use glean_core::normalize_date;
///
/// assert_eq!(normalize_date("2024-03-15"), "2024-03-15T00:00:00.000Z");
/// assert_eq!(normalize_date(" Spring 2024 "), "Spring 2024");
/// ```
pub fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => raw.trim().to_string(),
    }
}

/// The first date-shaped substring of `text`, if any.
pub fn find_date_in_text(text: &str) -> Option<&str> {
    DATE_IN_TEXT_RE.find(text).map(|m| m.as_str())
}
