//! Timestamp formatting utilities and time sources
//!
//! Formatters render record timestamps through [`TimestampFormat`], either in
//! local time or in UTC. Rotating sinks read the current time from a
//! [`Clock`] so rotation boundaries can be driven deterministically in tests.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use parking_lot::Mutex;
use std::fmt::Display;

/// Default human readable layout: `2025-01-08 10:30:45.123`
pub const STANDARD_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use rust_logging_facility::core::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Standard.format(&at, true), "2025-01-08 10:30:45.000");
/// assert_eq!(TimestampFormat::Unix.format(&at, true), "1736332245");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `2025-01-08 10:30:45.123`
    #[default]
    Standard,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Resolve a `datefmt` value from a configuration document.
    ///
    /// Accepts one of the named formats or a strftime pattern. Patterns with
    /// unknown specifiers are rejected.
    pub fn from_config(value: &str) -> std::result::Result<Self, String> {
        let format = match value.trim().to_ascii_lowercase().as_str() {
            "standard" => TimestampFormat::Standard,
            "iso8601" => TimestampFormat::Iso8601,
            "iso8601_micros" => TimestampFormat::Iso8601Micros,
            "rfc3339" => TimestampFormat::Rfc3339,
            "unix" => TimestampFormat::Unix,
            "unix_millis" => TimestampFormat::UnixMillis,
            _ => {
                if value.is_empty() {
                    return Err("date format must not be empty".to_string());
                }
                if StrftimeItems::new(value).any(|item| matches!(item, Item::Error)) {
                    return Err(format!("invalid strftime pattern '{}'", value));
                }
                TimestampFormat::Custom(value.to_string())
            }
        };
        Ok(format)
    }

    /// Format a UTC instant, converting to local time unless `utc` is set
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>, utc: bool) -> String {
        if utc {
            self.format_in(datetime)
        } else {
            self.format_in(&datetime.with_timezone(&Local))
        }
    }

    fn format_in<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self {
            TimestampFormat::Standard => datetime.format(STANDARD_TIMESTAMP).to_string(),
            TimestampFormat::Iso8601 => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::Iso8601Micros => {
                datetime.to_rfc3339_opts(SecondsFormat::Micros, true)
            }
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use rust_logging_facility::core::{Clock, ManualClock};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 8, 23, 59, 59).unwrap());
/// clock.advance(Duration::seconds(2));
/// assert_eq!(clock.now(), Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 1).unwrap());
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_standard_format() {
        let result = TimestampFormat::Standard.format(&fixed_datetime(), true);
        assert_eq!(result, "2025-01-08 10:30:45.123");
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime(), true);
        assert_eq!(result, "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_iso8601_micros_format() {
        let result = TimestampFormat::Iso8601Micros.format(&fixed_datetime(), true);
        assert_eq!(result, "2025-01-08T10:30:45.123456Z");
    }

    #[test]
    fn test_unix_formats() {
        assert_eq!(TimestampFormat::Unix.format(&fixed_datetime(), true), "1736332245");
        assert_eq!(
            TimestampFormat::UnixMillis.format(&fixed_datetime(), true),
            "1736332245123"
        );
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(&fixed_datetime(), true), "2025/01/08 10:30");
    }

    #[test]
    fn test_local_rendering_matches_conversion() {
        let expected = fixed_datetime()
            .with_timezone(&Local)
            .format(STANDARD_TIMESTAMP)
            .to_string();
        assert_eq!(TimestampFormat::Standard.format(&fixed_datetime(), false), expected);
    }

    #[test]
    fn test_from_config() {
        assert_eq!(
            TimestampFormat::from_config("iso8601").unwrap(),
            TimestampFormat::Iso8601
        );
        assert_eq!(
            TimestampFormat::from_config("UNIX_MILLIS").unwrap(),
            TimestampFormat::UnixMillis
        );
        assert_eq!(
            TimestampFormat::from_config("%H:%M:%S").unwrap(),
            TimestampFormat::Custom("%H:%M:%S".to_string())
        );
        assert!(TimestampFormat::from_config("%Q").is_err());
        assert!(TimestampFormat::from_config("").is_err());
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(fixed_datetime());
        assert_eq!(clock.now(), fixed_datetime());
        clock.advance(chrono::Duration::hours(1));
        assert_eq!(clock.now(), fixed_datetime() + chrono::Duration::hours(1));
        clock.set(fixed_datetime());
        assert_eq!(clock.now(), fixed_datetime());
    }
}
