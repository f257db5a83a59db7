//! Common utilities for certificate generation.
//!
//! Shared helpers for date formatting, attendance phrasing, HTML escaping,
//! and download filenames.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::tokens::LEGACY_ATTENDANCE_DATE;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Most placeholder dates emitted when a template is rendered without dates.
pub const MAX_PLACEHOLDER_DAYS: u32 = 10;

/// Parse a `YYYY-MM-DD` string as local midnight.
///
/// The time component is appended before parsing so the calendar day never
/// shifts with the host time zone.
pub fn parse_training_date(value: &str) -> Option<NaiveDate> {
    let with_midnight = format!("{}T00:00:00", value.trim());
    NaiveDateTime::parse_from_str(&with_midnight, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Format a training date as `dd/mm/yyyy`, passing unparsable input through.
pub fn format_short_date(value: &str) -> String {
    match parse_training_date(value) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => value.to_string(),
    }
}

/// Format a date in long form (e.g., "05 of March of 2025").
pub fn format_long_date(date: NaiveDate) -> String {
    let month = MONTHS[(date.month0() as usize).min(MONTHS.len() - 1)];
    format!("{:02} of {} of {}", date.day(), month, date.year())
}

/// The issue date: the last non-empty training date in long form.
///
/// Returns `None` when no date is available. An unparsable last date is
/// passed through unchanged.
pub fn issue_date(dates: &[String]) -> Option<String> {
    let last = dates.iter().rev().find(|d| !d.trim().is_empty())?;
    Some(match parse_training_date(last) {
        Some(date) => format_long_date(date),
        None => last.clone(),
    })
}

/// Sentence describing when the certified activity took place.
///
/// With no dates, `fallback_days` placeholders are emitted instead (clamped to
/// `1..=MAX_PLACEHOLDER_DAYS`) so the layout keeps its wording.
pub fn attendance_text(dates: &[String], fallback_days: u32) -> String {
    let formatted: Vec<String> = dates
        .iter()
        .filter(|d| !d.trim().is_empty())
        .map(|d| format_short_date(d))
        .collect();

    let days = if formatted.is_empty() {
        let count = fallback_days.clamp(1, MAX_PLACEHOLDER_DAYS) as usize;
        vec![LEGACY_ATTENDANCE_DATE.to_string(); count]
    } else {
        formatted
    };

    if days.len() == 1 {
        format!("Held on day <strong>{}</strong>", days[0])
    } else {
        format!("Held on days <strong>{}</strong>", days.join(", "))
    }
}

/// Escape text for insertion into HTML content or attribute values.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_dash && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    trimmed.to_string()
}
