//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a front-matter date string in the common formats
pub fn parse_post_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // RFC 3339 / ISO 8601 with offset; keep the calendar date as written
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Format date like "January 5, 2024". Unparseable input is returned as-is.
pub fn long_date(s: &str) -> String {
    parse_post_date(s)
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| s.to_string())
}

/// Format date like "Jan 5, 2024". Unparseable input is returned as-is.
pub fn short_date(s: &str) -> String {
    parse_post_date(s)
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| s.to_string())
}
