//! Tolerant date parsing and day-boundary clamping.
//!
//! Record timestamps arrive in whatever shape the exporting system used:
//! plain ISO dates, ISO datetimes with or without fractional seconds, or
//! full RFC 3339 timestamps. Unparsable values return `None` and the
//! record is excluded from period filtering rather than raising an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a calendar day out of a date or timestamp string.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(day);
    }
    parse_instant(trimmed).map(|instant| instant.date())
}

/// Parse a point in time, accepting RFC 3339 and common ISO shapes.
///
/// Offset-carrying timestamps keep their written wall-clock components;
/// this engine is timezone-free by design.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.naive_local());
    }
    if let Ok(instant) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(instant);
    }
    if let Ok(instant) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(instant);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(start_of_day)
}

/// 00:00:00.000 of the given day.
pub fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 of the given day. Every produced period end is clamped here.
pub fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid clock time"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_iso_date() {
        assert_eq!(parse_day("2024-03-15"), NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn parses_rfc3339_timestamp() {
        let instant = parse_instant("2024-03-15T14:30:00-03:00").unwrap();
        assert_eq!(instant.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(instant.time().to_string(), "14:30:00");
    }

    #[test]
    fn parses_datetime_without_offset() {
        assert!(parse_instant("2024-03-15T14:30:00").is_some());
        assert!(parse_instant("2024-03-15 14:30:00.250").is_some());
    }

    #[test]
    fn date_only_falls_to_midnight() {
        let instant = parse_instant("2024-03-15").unwrap();
        assert_eq!(
            instant,
            start_of_day(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_day(""), None);
        assert_eq!(parse_day("  "), None);
        assert_eq!(parse_day("not-a-date"), None);
        assert_eq!(parse_instant("15/03/2024"), None);
    }

    #[test]
    fn clamps_cover_the_whole_day() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(start_of_day(day).to_string(), "2024-03-15 00:00:00");
        assert_eq!(end_of_day(day).to_string(), "2024-03-15 23:59:59.999");
    }
}
