//! Date formatting for the reader.
//!
//! | Format | Example |
//! |--------|---------|
//! | `Short` | `Jan 5` |
//! | `Long` | `January 5, 2024` |
//! | `Full` | `January 5, 2024 09:30` |
//!
//! Timestamps are shown in the local time zone. Empty input renders empty;
//! input that [`parse_timestamp`] rejects is shown as-is.

use crate::models::parse_timestamp;
use chrono::{Local, TimeZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    Short,
    Long,
    Full,
}

impl DateFormat {
    fn pattern(self) -> &'static str {
        match self {
            DateFormat::Short => "%b %-d",
            DateFormat::Long => "%B %-d, %Y",
            DateFormat::Full => "%B %-d, %Y %H:%M",
        }
    }
}

/// Format an ISO-8601 timestamp in the local time zone.
pub fn format_date(iso: &str, format: DateFormat) -> String {
    format_date_in(iso, format, &Local)
}

/// Format an ISO-8601 timestamp in `tz`.
pub fn format_date_in<Tz>(iso: &str, format: DateFormat, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if iso.is_empty() {
        return String::new();
    }
    match parse_timestamp(iso) {
        Some(dt) => dt.with_timezone(tz).format(format.pattern()).to_string(),
        None => iso.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_formats_in_utc() {
        let iso = "2024-01-05T09:30:00Z";
        assert_eq!(format_date_in(iso, DateFormat::Short, &Utc), "Jan 5");
        assert_eq!(format_date_in(iso, DateFormat::Long, &Utc), "January 5, 2024");
        assert_eq!(format_date_in(iso, DateFormat::Full, &Utc), "January 5, 2024 09:30");
    }

    #[test]
    fn test_converts_to_target_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(
            format_date_in("2024-01-05T20:00:00Z", DateFormat::Full, &tokyo),
            "January 6, 2024 05:00"
        );
    }

    #[test]
    fn test_date_only_and_offsetless_input() {
        assert_eq!(format_date_in("2024-01-10", DateFormat::Short, &Utc), "Jan 10");
        assert_eq!(format_date_in("2024-01-10", DateFormat::Long, &Utc), "January 10, 2024");
        assert_eq!(
            format_date_in("2024-01-05T10:00:00", DateFormat::Full, &Utc),
            "January 5, 2024 10:00"
        );
    }

    #[test]
    fn test_empty_and_unparseable() {
        assert_eq!(format_date("", DateFormat::Short), "");
        assert_eq!(format_date("last week", DateFormat::Long), "last week");
    }
}
