//! Rotation schedules for time-rotating file sinks
//!
//! A schedule turns "now" into the next rotation boundary and names the
//! archive of the period that ends at a boundary.

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Rotation unit, as spelled in configuration documents (`S`, `M`, `H`,
/// `D`, `MIDNIGHT`, `W0`..`W6`).
///
/// # Examples
///
/// ```
/// use rust_logging_facility::sinks::RotationWhen;
///
/// assert_eq!("midnight".parse::<RotationWhen>().unwrap(), RotationWhen::Midnight);
/// assert_eq!("W6".parse::<RotationWhen>().unwrap(), RotationWhen::Weekday(6));
/// assert!("W7".parse::<RotationWhen>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationWhen {
    Seconds,
    Minutes,
    #[default]
    Hours,
    Days,
    Midnight,
    /// Midnight at the start of the given weekday, Monday = 0
    Weekday(u8),
}

impl RotationWhen {
    /// strftime layout of archive suffixes
    pub fn suffix_format(&self) -> &'static str {
        match self {
            RotationWhen::Seconds => "%Y-%m-%d_%H-%M-%S",
            RotationWhen::Minutes => "%Y-%m-%d_%H-%M",
            RotationWhen::Hours => "%Y-%m-%d_%H",
            RotationWhen::Days | RotationWhen::Midnight | RotationWhen::Weekday(_) => "%Y-%m-%d",
        }
    }

    /// Digit shape of archive suffixes, `#` standing for one digit
    fn suffix_shape(&self) -> &'static str {
        match self {
            RotationWhen::Seconds => "####-##-##_##-##-##",
            RotationWhen::Minutes => "####-##-##_##-##",
            RotationWhen::Hours => "####-##-##_##",
            RotationWhen::Days | RotationWhen::Midnight | RotationWhen::Weekday(_) => "####-##-##",
        }
    }

    /// Seconds in one unit, taking calendar days as 86400 seconds
    fn unit_seconds(&self) -> i64 {
        match self {
            RotationWhen::Seconds => 1,
            RotationWhen::Minutes => 60,
            RotationWhen::Hours => 3_600,
            RotationWhen::Days | RotationWhen::Midnight => 86_400,
            RotationWhen::Weekday(_) => 7 * 86_400,
        }
    }

    /// Length of one unit for the fixed-length variants
    fn unit(&self) -> Option<Duration> {
        match self {
            RotationWhen::Seconds => Some(Duration::seconds(1)),
            RotationWhen::Minutes => Some(Duration::minutes(1)),
            RotationWhen::Hours => Some(Duration::hours(1)),
            RotationWhen::Days => Some(Duration::days(1)),
            RotationWhen::Midnight | RotationWhen::Weekday(_) => None,
        }
    }
}

impl fmt::Display for RotationWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationWhen::Seconds => f.write_str("S"),
            RotationWhen::Minutes => f.write_str("M"),
            RotationWhen::Hours => f.write_str("H"),
            RotationWhen::Days => f.write_str("D"),
            RotationWhen::Midnight => f.write_str("MIDNIGHT"),
            RotationWhen::Weekday(day) => write!(f, "W{}", day),
        }
    }
}

impl FromStr for RotationWhen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "S" => Ok(RotationWhen::Seconds),
            "M" => Ok(RotationWhen::Minutes),
            "H" => Ok(RotationWhen::Hours),
            "D" => Ok(RotationWhen::Days),
            "MIDNIGHT" => Ok(RotationWhen::Midnight),
            w if w.len() == 2 && w.starts_with('W') => match w.as_bytes()[1] {
                digit @ b'0'..=b'6' => Ok(RotationWhen::Weekday(digit - b'0')),
                _ => Err(format!("invalid weekday rotation '{}' (expected W0-W6)", s)),
            },
            _ => Err(format!(
                "invalid rotation unit '{}' (expected S, M, H, D, MIDNIGHT or W0-W6)",
                s
            )),
        }
    }
}

/// When a file rotates: a unit, a multiplier and the time zone boundaries
/// are computed in.
///
/// # Examples
///
/// ```
/// use rust_logging_facility::sinks::{RotationSchedule, RotationWhen};
/// use chrono::{TimeZone, Utc};
///
/// let daily = RotationSchedule::new(RotationWhen::Midnight, 1).unwrap().with_utc(true);
/// let now = Utc.with_ymd_and_hms(2025, 1, 8, 15, 0, 0).unwrap();
/// let boundary = daily.next_boundary(now);
/// assert_eq!(boundary, Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap());
/// assert_eq!(daily.archive_suffix(boundary), "2025-01-08");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSchedule {
    when: RotationWhen,
    interval: u32,
    utc: bool,
}

impl Default for RotationSchedule {
    fn default() -> Self {
        Self {
            when: RotationWhen::default(),
            interval: 1,
            utc: false,
        }
    }
}

/// Longest rotation period a schedule accepts, in days
pub const MAX_ROTATION_DAYS: i64 = 36_600;

impl RotationSchedule {
    /// `interval` must be at least 1, and `interval` units must not exceed
    /// [`MAX_ROTATION_DAYS`]
    pub fn new(when: RotationWhen, interval: u32) -> Result<Self, String> {
        if interval == 0 {
            return Err("rotation interval must be at least 1".to_string());
        }
        let span = when.unit_seconds().checked_mul(i64::from(interval));
        if !matches!(span, Some(secs) if secs <= MAX_ROTATION_DAYS * 86_400) {
            return Err(format!(
                "rotation interval {} x {} exceeds {} days",
                interval, when, MAX_ROTATION_DAYS
            ));
        }
        Ok(Self {
            when,
            interval,
            utc: false,
        })
    }

    /// Every night at midnight, local time
    pub fn daily_at_midnight() -> Self {
        Self {
            when: RotationWhen::Midnight,
            interval: 1,
            utc: false,
        }
    }

    #[must_use]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    pub fn when(&self) -> RotationWhen {
        self.when
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn is_utc(&self) -> bool {
        self.utc
    }

    fn to_naive(&self, at: DateTime<Utc>) -> NaiveDateTime {
        if self.utc {
            at.naive_utc()
        } else {
            at.with_timezone(&Local).naive_local()
        }
    }

    fn from_naive(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        if self.utc {
            return Utc.from_utc_datetime(&naive);
        }
        match Local.from_local_datetime(&naive) {
            LocalResult::Single(at) => at.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            // Inside a DST gap: the boundary moves to the first valid instant
            LocalResult::None => Local
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .map(|at| at.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
        }
    }

    fn span(&self) -> Duration {
        Duration::seconds(self.when.unit_seconds() * i64::from(self.interval))
    }

    /// First boundary strictly after `from`
    pub fn next_boundary(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        if self.when.unit().is_some() {
            return from
                .checked_add_signed(self.span())
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
        }

        let local = self.to_naive(from);
        let first = local.date().succ_opt().and_then(|tomorrow| match self.when {
            RotationWhen::Weekday(day) => {
                let start = tomorrow.weekday().num_days_from_monday() as i64;
                let ahead = (i64::from(day) - start).rem_euclid(7);
                tomorrow.checked_add_signed(Duration::days(ahead))
            }
            _ => Some(tomorrow),
        });
        match first.and_then(|first| first.checked_add_signed(self.span() - self.unit_span())) {
            Some(target) => self.from_naive(target.and_time(chrono::NaiveTime::MIN)),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    /// One unit of the calendar-based variants
    fn unit_span(&self) -> Duration {
        match self.when {
            RotationWhen::Weekday(_) => Duration::days(7),
            _ => Duration::days(1),
        }
    }

    /// Start of the period that ends at `boundary`
    pub fn period_start(&self, boundary: DateTime<Utc>) -> DateTime<Utc> {
        if self.when.unit().is_some() {
            return boundary
                .checked_sub_signed(self.span())
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
        }
        match self.to_naive(boundary).checked_sub_signed(self.span()) {
            Some(start) => self.from_naive(start),
            None => DateTime::<Utc>::MIN_UTC,
        }
    }

    /// Archive suffix for the period ending at `boundary`
    pub fn archive_suffix(&self, boundary: DateTime<Utc>) -> String {
        self.to_naive(self.period_start(boundary))
            .format(self.when.suffix_format())
            .to_string()
    }

    /// Whether `candidate` looks like a suffix this schedule produces
    pub fn matches_suffix(&self, candidate: &str) -> bool {
        let shape = self.when.suffix_shape();
        candidate.len() == shape.len()
            && candidate
                .bytes()
                .zip(shape.bytes())
                .all(|(c, s)| if s == b'#' { c.is_ascii_digit() } else { c == s })
    }
}

impl fmt::Display for RotationSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} x {}", self.interval, self.when)?;
        if self.utc {
            f.write_str(" (UTC)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn utc(when: RotationWhen, interval: u32) -> RotationSchedule {
        RotationSchedule::new(when, interval).unwrap().with_utc(true)
    }

    #[test]
    fn test_parse_when() {
        assert_eq!("s".parse::<RotationWhen>().unwrap(), RotationWhen::Seconds);
        assert_eq!("H".parse::<RotationWhen>().unwrap(), RotationWhen::Hours);
        assert_eq!("w0".parse::<RotationWhen>().unwrap(), RotationWhen::Weekday(0));
        assert!("X".parse::<RotationWhen>().is_err());
        assert!("W".parse::<RotationWhen>().is_err());
        assert_eq!(RotationWhen::Weekday(3).to_string(), "W3");
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(RotationSchedule::new(RotationWhen::Hours, 0).is_err());
    }

    #[test]
    fn test_oversized_interval_rejected() {
        assert!(RotationSchedule::new(RotationWhen::Days, 100_000_000).is_err());
        assert!(RotationSchedule::new(RotationWhen::Days, 3_000_000_000).is_err());
        assert!(RotationSchedule::new(RotationWhen::Midnight, 200_000_000).is_err());
        assert!(RotationSchedule::new(RotationWhen::Hours, 3_000_000_000).is_err());
        assert!(RotationSchedule::new(RotationWhen::Seconds, u32::MAX).is_err());
        assert!(RotationSchedule::new(RotationWhen::Weekday(2), 6_000).is_err());

        let err = RotationSchedule::new(RotationWhen::Days, 100_000_000).unwrap_err();
        assert!(err.contains("exceeds"), "{}", err);
    }

    #[test]
    fn test_longest_interval_stays_in_the_future() {
        let now = at(2026, 10, 19, 20, 0, 0);
        for schedule in [
            utc(RotationWhen::Days, MAX_ROTATION_DAYS as u32),
            utc(RotationWhen::Midnight, MAX_ROTATION_DAYS as u32),
            utc(RotationWhen::Weekday(0), (MAX_ROTATION_DAYS / 7) as u32),
            utc(RotationWhen::Hours, (MAX_ROTATION_DAYS * 24) as u32),
        ] {
            let boundary = schedule.next_boundary(now);
            assert!(boundary > now, "{} went backwards", schedule);
            assert!(schedule.period_start(boundary) <= now, "{}", schedule);
        }
    }

    #[test]
    fn test_boundary_saturates_at_end_of_time() {
        let schedule = utc(RotationWhen::Days, 10);
        let late = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert_eq!(schedule.next_boundary(late), DateTime::<Utc>::MAX_UTC);
        assert_eq!(
            utc(RotationWhen::Midnight, 10).next_boundary(late),
            DateTime::<Utc>::MAX_UTC
        );
    }

    #[test]
    fn test_midnight_boundaries() {
        let daily = utc(RotationWhen::Midnight, 1);
        assert_eq!(daily.next_boundary(at(2025, 1, 8, 0, 0, 0)), at(2025, 1, 9, 0, 0, 0));
        assert_eq!(daily.next_boundary(at(2025, 1, 8, 23, 59, 59)), at(2025, 1, 9, 0, 0, 0));

        let every_third = utc(RotationWhen::Midnight, 3);
        assert_eq!(
            every_third.next_boundary(at(2025, 1, 8, 12, 0, 0)),
            at(2025, 1, 11, 0, 0, 0)
        );
        assert_eq!(every_third.archive_suffix(at(2025, 1, 11, 0, 0, 0)), "2025-01-08");
    }

    #[test]
    fn test_weekday_boundaries() {
        // 2025-01-08 is a Wednesday
        let mondays = utc(RotationWhen::Weekday(0), 1);
        assert_eq!(mondays.next_boundary(at(2025, 1, 8, 9, 0, 0)), at(2025, 1, 13, 0, 0, 0));
        // On a Monday the next Monday midnight is a week away
        assert_eq!(
            mondays.next_boundary(at(2025, 1, 13, 0, 0, 0)),
            at(2025, 1, 20, 0, 0, 0)
        );
        let thursdays = utc(RotationWhen::Weekday(3), 2);
        assert_eq!(
            thursdays.next_boundary(at(2025, 1, 8, 9, 0, 0)),
            at(2025, 1, 16, 0, 0, 0)
        );
        assert_eq!(mondays.archive_suffix(at(2025, 1, 13, 0, 0, 0)), "2025-01-06");
    }

    #[test]
    fn test_fixed_unit_boundaries_and_suffixes() {
        let hourly = utc(RotationWhen::Hours, 1);
        let boundary = hourly.next_boundary(at(2025, 1, 8, 10, 30, 0));
        assert_eq!(boundary, at(2025, 1, 8, 11, 30, 0));
        assert_eq!(hourly.archive_suffix(boundary), "2025-01-08_10");

        let seconds = utc(RotationWhen::Seconds, 5);
        let boundary = seconds.next_boundary(at(2025, 1, 8, 10, 30, 0));
        assert_eq!(boundary, at(2025, 1, 8, 10, 30, 5));
        assert_eq!(seconds.archive_suffix(boundary), "2025-01-08_10-30-00");

        let minutes = utc(RotationWhen::Minutes, 1);
        assert_eq!(
            minutes.archive_suffix(at(2025, 1, 8, 10, 31, 0)),
            "2025-01-08_10-30"
        );
    }

    #[test]
    fn test_suffix_shape() {
        let daily = utc(RotationWhen::Midnight, 1);
        assert!(daily.matches_suffix("2025-01-08"));
        assert!(!daily.matches_suffix("2025-01-08_10"));
        assert!(!daily.matches_suffix("backup"));

        let hourly = utc(RotationWhen::Hours, 1);
        assert!(hourly.matches_suffix("2025-01-08_10"));
        assert!(!hourly.matches_suffix("2025-01-08"));
    }

    #[test]
    fn test_local_boundary_is_local_midnight() {
        let daily = RotationSchedule::daily_at_midnight();
        let boundary = daily.next_boundary(Utc::now());
        let local = boundary.with_timezone(&Local);
        assert!(boundary > Utc::now());
        assert_eq!(local.format("%H:%M").to_string(), "00:00");
    }
}
