//! Lenient parsing of the date strings users type into CSV exports and forms.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d %B %Y"];

/// Parse a calendar date. Accepts ISO dates, US-style `MM/DD/YYYY`, slash ISO,
/// long-form dates and RFC 3339 timestamps (the time part is dropped).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Compare two date strings as calendar dates when both parse, otherwise as raw
/// strings.
pub fn compare_date_strings(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Render a date string as "Month Year" (e.g. "June 2024"). Returns `None` when
/// the value is not a recognizable date.
pub fn format_month_year(value: &str) -> Option<String> {
    parse_date(value).map(|d| d.format("%B %Y").to_string())
}
