//! Snapshot value parsing utilities
//!
//! Timestamps are written in one canonical format but older snapshots
//! used the text menu's 12-hour format, so both are accepted on read.

use chrono::{DateTime, NaiveDateTime};

/// Canonical on-disk timestamp format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `DD/MM/YY hh:mm AM/PM`, as typed into the text menu
pub const MENU_TIMESTAMP_FORMAT: &str = "%d/%m/%y %I:%M %p";

/// Format a timestamp for the snapshot
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored or user-entered timestamp.
///
/// Accepts the canonical format, the menu format and RFC 3339. RFC 3339
/// values keep the wall-clock time they were written with.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, MENU_TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.naive_local()))
        .or_else(|_| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT))
}
