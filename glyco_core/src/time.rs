//! Wire timestamp normalization and query-date formatting.
//!
//! The data collaborator stamps every event with a UTC designator even though
//! the clock fields are already local wall-clock time. The designator is
//! dropped and the remaining fields are read as-is, with no offset arithmetic.

use crate::{Error, LocalInstant, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Accepted layouts once the designator is gone, most common first
const WIRE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar dates cross the collaborator boundary in this layout
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert a wire timestamp into a local instant.
///
/// `2024-05-01T06:12:00.000Z` becomes 06:12 local, never 06:12 shifted by the
/// host's UTC offset. Instants too close to the edge of the representable
/// range to be windowed are rejected.
pub fn normalize_timestamp(raw: &str) -> Result<LocalInstant> {
    let fields = strip_designator(raw);

    let at = WIRE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(fields, fmt).ok())
        .ok_or_else(|| Error::Timestamp(format!("unrecognized timestamp '{}'", raw)))?;

    let margin = Duration::days(1);
    if at.checked_sub_signed(margin).is_none() || at.checked_add_signed(margin).is_none() {
        return Err(Error::Timestamp(format!("timestamp '{}' is out of range", raw)));
    }
    Ok(at)
}

/// Drop a trailing `Z` or numeric offset, leaving only the clock fields
fn strip_designator(raw: &str) -> &str {
    let s = raw.trim();
    if let Some(rest) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        return rest;
    }

    // Numeric offset only counts after the time separator
    let Some(time_start) = s.find(|c: char| c == 'T' || c == ' ') else {
        return s;
    };
    match s[time_start..].rfind(|c: char| c == '+' || c == '-') {
        Some(i) if is_offset(&s[time_start + i + 1..]) => &s[..time_start + i],
        _ => s,
    }
}

/// `hh`, `hhmm` or `hh:mm`
fn is_offset(s: &str) -> bool {
    let b = s.as_bytes();
    let digits = |r: &[u8]| r.iter().all(u8::is_ascii_digit);
    match b.len() {
        2 | 4 => digits(b),
        5 => b[2] == b':' && digits(&b[..2]) && digits(&b[3..]),
        _ => false,
    }
}

/// Format a calendar date for a day or week query
pub fn format_query_date(date: NaiveDate) -> String {
    date.format(QUERY_DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` query date
pub fn parse_query_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), QUERY_DATE_FORMAT)
        .map_err(|e| Error::Timestamp(format!("invalid date '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_designator_is_discarded_not_applied() {
        let at = normalize_timestamp("2024-05-01T06:12:00.000Z").unwrap();
        assert_eq!(at.hour(), 6);
        assert_eq!(at.minute(), 12);
        assert_eq!(at.day(), 1);
    }

    #[test]
    fn test_numeric_offset_is_discarded() {
        let at = normalize_timestamp("2024-05-01T23:45:10+00:00").unwrap();
        assert_eq!(at.hour(), 23);
        assert_eq!(at.second(), 10);

        let at = normalize_timestamp("2024-05-01T23:45:10-05:00").unwrap();
        assert_eq!(at.hour(), 23);
        assert_eq!(at.day(), 1);
    }

    #[test]
    fn test_basic_format_offsets_are_discarded() {
        let at = normalize_timestamp("2024-05-01T06:12:00+0000").unwrap();
        assert_eq!((at.hour(), at.minute()), (6, 12));

        let at = normalize_timestamp("2024-05-01T06:12:00-03").unwrap();
        assert_eq!((at.hour(), at.minute()), (6, 12));

        let at = normalize_timestamp("2024-05-01 06:12+0530").unwrap();
        assert_eq!((at.hour(), at.minute()), (6, 12));
    }

    #[test]
    fn test_edge_of_range_is_rejected() {
        assert!(matches!(
            normalize_timestamp("+262142-12-31T23:59:00Z"),
            Err(Error::Timestamp(_))
        ));
    }

    #[test]
    fn test_fractional_seconds_kept() {
        let at = normalize_timestamp("2024-05-01T05:57:30.250Z").unwrap();
        assert_eq!(at.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_without_designator() {
        let at = normalize_timestamp("2024-05-01 08:05").unwrap();
        assert_eq!(at.hour(), 8);
        assert_eq!(at.minute(), 5);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(
            normalize_timestamp("yesterday-ish"),
            Err(Error::Timestamp(_))
        ));
        assert!(normalize_timestamp("").is_err());
    }

    #[test]
    fn test_query_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_query_date(date), "2024-03-07");
        assert_eq!(parse_query_date("2024-03-07").unwrap(), date);
        assert!(parse_query_date("07/03/2024").is_err());
    }
}
