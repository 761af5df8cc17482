//! ISO-8601 parsing and `DD/MM/YYYY` display of task dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Display pattern used in reports.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Input was not an ISO-8601 date or timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not an ISO-8601 date")]
pub struct DateParseError {
    pub input: String,
}

/// Parse an ISO-8601 date or timestamp and return its calendar date.
///
/// Timestamps carrying an offset keep the date in that offset; no conversion
/// to local time happens. A trailing `Z` is read as `+00:00`.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let normalized = match input.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => input.to_string(),
    };

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt.date_naive());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt.date());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").map_err(|_| DateParseError {
        input: input.to_string(),
    })
}

/// `YYYY-MM-DDTHH` with an optional offset becomes `YYYY-MM-DDTHH:00`.
fn expand_bare_hour(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if bytes.len() < 13 || !matches!(bytes[10], b'T' | b' ') {
        return None;
    }
    if !bytes[11..13].iter().all(u8::is_ascii_digit) {
        return None;
    }
    match bytes.get(13) {
        None | Some(b'+') | Some(b'-') => Some(format!("{}:00{}", &s[..13], &s[13..])),
        _ => None,
    }
}

/// Whether a raw date field counts as absent.
pub fn is_blank(value: Option<&str>) -> bool {
    matches!(value, None | Some("") | Some("null") | Some("NULL"))
}

/// A calendar date rendered as `DD/MM/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormattedDate(NaiveDate);

impl FormattedDate {
    pub fn parse(input: &str) -> Result<Self, DateParseError> {
        parse_iso_date(input).map(Self)
    }
}

impl std::fmt::Display for FormattedDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

/// Render a raw date field for the report.
///
/// Blank values become `""`; values that do not parse are passed through
/// unchanged.
pub fn format_date(value: Option<&str>) -> String {
    match value {
        v if is_blank(v) => String::new(),
        Some(raw) => match FormattedDate::parse(raw) {
            Ok(date) => date.to_string(),
            Err(e) => {
                tracing::debug!("{}, keeping raw value", e);
                raw.to_string()
            }
        },
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_inputs() {
        assert_eq!(format_date(None), "");
        assert_eq!(format_date(Some("")), "");
        assert_eq!(format_date(Some("null")), "");
        assert_eq!(format_date(Some("NULL")), "");
    }

    #[test]
    fn test_iso_variants() {
        assert_eq!(format_date(Some("2024-03-05")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T14:30:00")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T14:30:00.123")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05 08:00:00")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T14:30")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T23:59:59Z")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T23:59:59-03:00")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T01:00:00.5+0100")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05 14:30")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05 14:30-03:00")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05 14:30+0100")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05 14:30Z")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T14:30Z")), "05/03/2024");
    }

    #[test]
    fn test_hour_without_minutes() {
        assert_eq!(format_date(Some("2024-03-05T14")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05 14")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T14Z")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05 14-03:00")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T1")), "2024-03-05T1");
        assert_eq!(format_date(Some("2024-03-05T14x")), "2024-03-05T14x");
    }

    #[test]
    fn test_offset_date_is_not_converted() {
        // 23:30 at -03:00 is already the 6th in UTC; the local date stays.
        assert_eq!(
            parse_iso_date("2024-03-05T23:30:00-03:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_unparseable_passes_through() {
        assert_eq!(format_date(Some("amanhã")), "amanhã");
        assert_eq!(format_date(Some("05/03/2024")), "05/03/2024");
        assert_eq!(format_date(Some("2024-13-40")), "2024-13-40");
        assert_eq!(format_date(Some(" ")), " ");
    }

    #[test]
    fn test_parse_error_carries_input() {
        let err = FormattedDate::parse("not a date").unwrap_err();
        assert_eq!(err.input, "not a date");
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["2023-01-31", "2024-02-29T10:00:00", "1999-12-31T23:59:59Z"] {
            let original = parse_iso_date(input).unwrap();
            let shown = format_date(Some(input));
            let reparsed = NaiveDate::parse_from_str(&shown, DISPLAY_FORMAT).unwrap();
            assert_eq!(original, reparsed, "round trip failed for {input}");
        }
    }
}
