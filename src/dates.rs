//! Date normalization shared by the export projection and the import reader.
//!
//! Exported workbooks always show dates as `DD/MM/YYYY`. Incoming values are
//! not canonical: the application stores ISO-8601 timestamps, older records
//! carry pre-formatted strings, and spreadsheets hand us Excel serials. The
//! normalizer tries a fixed chain of strategies and returns an empty string
//! rather than guessing when none of them applies.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::error;

/// Output format of every normalized date.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Formats written by the application itself, tried after the lenient parser
/// and the manual ISO split have both given up.
const FIXED_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%d %H:%M:%S",
];
const FIXED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalizes an optional date-like value, see [`format_date`].
pub fn format_optional_date(value: Option<&str>) -> String {
    value.map(format_date).unwrap_or_default()
}

/// Normalizes a date-like string to `DD/MM/YYYY`.
///
/// Returns an empty string when the value is empty or cannot be parsed. A
/// value that is already in `DD/MM/YYYY` shape is returned untouched.
pub fn format_date(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    if is_display_formatted(value) {
        return value.to_string();
    }

    if let Some(date) = parse_lenient(value) {
        return date.format(DISPLAY_FORMAT).to_string();
    }

    if let Some(rearranged) = rearrange_iso_date(value) {
        return rearranged;
    }

    if let Some(date) = parse_fixed_formats(value) {
        return date.format(DISPLAY_FORMAT).to_string();
    }

    error!(value, "could not parse date, leaving it empty");
    String::new()
}

/// Converts an Excel serial number (1900 date system) into a date-time.
///
/// Serials below 60 are shifted by one day to account for the fictitious
/// 29 February 1900 that Excel counts.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = if serial < 60.0 { serial + 1.0 } else { serial };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (days * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::try_milliseconds(millis)?)
}

fn is_display_formatted(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    chars.len() == 10 && chars[2] == '/' && chars[5] == '/'
}

#[cfg(feature = "lenient-dates")]
fn parse_lenient(value: &str) -> Option<NaiveDate> {
    use chrono::DateTime;
    use tracing::debug;

    const DATE_TIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d-%m-%Y", "%d.%m.%Y"];

    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.date_naive());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.date_naive());
    }
    let parsed = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|date_time| date_time.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        });

    if parsed.is_none() {
        debug!(value, "lenient date parsing failed, trying manual formats");
    }
    parsed
}

#[cfg(not(feature = "lenient-dates"))]
fn parse_lenient(value: &str) -> Option<NaiveDate> {
    tracing::warn!(
        value,
        "lenient date parsing is not compiled in, using manual ISO parsing"
    );
    None
}

/// Splits `YYYY-MM-DDT...` on the first `T` and reorders the date part.
/// Components are moved, not validated.
fn rearrange_iso_date(value: &str) -> Option<String> {
    let (date_part, _) = value.split_once('T')?;
    let bytes = date_part.as_bytes();
    if date_part.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let year = date_part.get(0..4)?;
    let month = date_part.get(5..7)?;
    let day = date_part.get(8..10)?;
    Some(format!("{day}/{month}/{year}"))
}

fn parse_fixed_formats(value: &str) -> Option<NaiveDate> {
    FIXED_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|date_time| date_time.date())
        .or_else(|| NaiveDate::parse_from_str(value, FIXED_DATE_FORMAT).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_timestamp_is_reordered() {
        assert_eq!(format_date("2024-03-07T10:00:00Z"), "07/03/2024");
        assert_eq!(format_date("2024-03-07T10:00:00.123Z"), "07/03/2024");
        assert_eq!(format_date("2024-03-07"), "07/03/2024");
        assert_eq!(format_date("2024-03-07 08:15:00"), "07/03/2024");
    }

    #[test]
    fn display_format_is_idempotent() {
        for value in ["07/03/2024", "31/12/1999", "01/01/2000"] {
            let once = format_date(value);
            assert_eq!(once, value);
            assert_eq!(format_date(&once), value);
        }
    }

    #[test]
    fn empty_and_garbage_become_empty() {
        assert_eq!(format_date(""), "");
        assert_eq!(format_optional_date(None), "");
        assert_eq!(format_date("not a date"), "");
        assert_eq!(format_date("   "), "");
    }

    #[test]
    fn impossible_iso_date_is_rearranged_without_validation() {
        assert_eq!(format_date("2024-02-30T00:00:00Z"), "30/02/2024");
    }

    #[test]
    fn offset_timestamp_keeps_local_date() {
        assert_eq!(format_date("2024-03-07T23:30:00-05:00"), "07/03/2024");
    }

    #[cfg(not(feature = "lenient-dates"))]
    #[test]
    fn manual_parsers_cover_iso_values_without_lenient_dates() {
        assert_eq!(format_date("2024-03-07T10:00:00Z"), "07/03/2024");
        assert_eq!(format_date("2024-03-07"), "07/03/2024");
        assert_eq!(format_date("07/03/2024"), "07/03/2024");
        assert_eq!(format_date("March 7, 2024"), "");
    }

    #[test]
    fn excel_serials_convert_to_calendar_dates() {
        let date = excel_serial_to_datetime(45_658.0).expect("valid serial");
        assert_eq!(date.format(DISPLAY_FORMAT).to_string(), "01/01/2025");

        let with_time = excel_serial_to_datetime(45_658.5).expect("valid serial");
        assert_eq!(with_time.format("%H:%M").to_string(), "12:00");

        assert!(excel_serial_to_datetime(f64::NAN).is_none());
        assert!(excel_serial_to_datetime(-1.0).is_none());
    }
}
