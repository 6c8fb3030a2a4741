//! Lightweight calendar and clock utilities (no chrono dependency).
//!
//! Uses Howard Hinnant's civil_from_days algorithm for Unix-to-date conversion.
//! Wall-clock reads go through the [`Clock`] trait so "today" is injectable.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A month/day pair with the year dropped. Months and days are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    /// Panics on an out-of-domain pair; use [`MonthDay::try_new`] for input.
    pub fn new(month: u32, day: u32) -> Self {
        Self::try_new(month, day)
            .unwrap_or_else(|| panic!("invalid month/day: {month}/{day}"))
    }

    /// Accepts all 366 calendar values, Feb 29 included.
    pub fn try_new(month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > max_days_in_month(month) {
            return None;
        }
        Some(Self { month, day })
    }

    /// Canonical ordering value: `month * 100 + day`.
    pub fn canonical(self) -> u32 {
        self.month * 100 + self.day
    }

    /// Zero-based month index (0 = January).
    pub fn month_index(self) -> usize {
        (self.month - 1) as usize
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Longest possible length of a month in any year.
fn max_days_in_month(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// A proleptic Gregorian date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i64,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i64, month: u32, day: u32) -> Option<Self> {
        let md = MonthDay::try_new(month, day)?;
        if md.month == 2 && md.day == 29 && !is_leap_year(year) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Parse `YYYY-MM-DD`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().splitn(3, '-');
        let year = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let day = parts.next()?.parse().ok()?;
        Self::new(year, month, day)
    }

    pub fn month_day(self) -> MonthDay {
        MonthDay {
            month: self.month,
            day: self.day,
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// Local date and time as seen by the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDateTime {
    pub date: CalendarDate,
    pub time: TimeOfDay,
}

impl LocalDateTime {
    /// Midnight of the given date.
    pub fn at_midnight(date: CalendarDate) -> Self {
        Self {
            date,
            time: TimeOfDay {
                hour: 0,
                minute: 0,
                second: 0,
            },
        }
    }

    /// Convert Unix seconds to local time at a fixed UTC offset.
    pub fn from_unix(secs: i64, utc_offset_minutes: i32) -> Self {
        let local = secs + i64::from(utc_offset_minutes) * 60;
        let days = local.div_euclid(86400);
        let time_of_day = local.rem_euclid(86400);
        let (year, month, day) = civil_from_days(days);
        Self {
            date: CalendarDate { year, month, day },
            time: TimeOfDay {
                hour: (time_of_day / 3600) as u32,
                minute: ((time_of_day % 3600) / 60) as u32,
                second: (time_of_day % 60) as u32,
            },
        }
    }
}

/// Injectable source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> LocalDateTime;

    fn today(&self) -> CalendarDate {
        self.now().date
    }
}

/// Reads the system clock and shifts it by a fixed UTC offset.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    pub utc_offset_minutes: i32,
}

impl SystemClock {
    pub fn new(utc_offset_minutes: i32) -> Self {
        Self { utc_offset_minutes }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> LocalDateTime {
        LocalDateTime::from_unix(now_unix_secs(), self.utc_offset_minutes)
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub LocalDateTime);

impl FixedClock {
    pub fn on(date: CalendarDate) -> Self {
        Self(LocalDateTime::at_midnight(date))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> LocalDateTime {
        self.0
    }
}

/// Current UTC time as Unix seconds.
pub fn now_unix_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Howard Hinnant's civil_from_days: Unix epoch days → (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m as u32, d as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_epoch() {
        let t = LocalDateTime::from_unix(0, 0);
        assert_eq!(t.date.to_string(), "1970-01-01");
        assert_eq!(t.time.hour, 0);
    }

    #[test]
    fn test_known_date() {
        // 2026-02-21T00:00:00Z = 1771632000
        let t = LocalDateTime::from_unix(1771632000, 0);
        assert_eq!(t.date, CalendarDate::new(2026, 2, 21).unwrap());
    }

    #[test]
    fn test_offset_crosses_midnight() {
        // 2026-02-03T20:00:00Z is already Feb 4 in UTC+8
        let t = LocalDateTime::from_unix(1771632000 - 17 * 86400 - 4 * 3600, 480);
        assert_eq!(t.date, CalendarDate::new(2026, 2, 4).unwrap());
        assert_eq!(t.time.hour, 4);
    }

    #[test]
    fn test_negative_offset_before_epoch() {
        let t = LocalDateTime::from_unix(0, -60);
        assert_eq!(t.date.to_string(), "1969-12-31");
        assert_eq!(t.time.hour, 23);
    }

    #[test]
    fn test_month_day_domain() {
        assert!(MonthDay::try_new(2, 29).is_some());
        assert!(MonthDay::try_new(2, 30).is_none());
        assert!(MonthDay::try_new(4, 31).is_none());
        assert!(MonthDay::try_new(13, 1).is_none());
        assert!(MonthDay::try_new(1, 0).is_none());
        assert_eq!(MonthDay::new(3, 21).canonical(), 321);
        assert_eq!(MonthDay::new(12, 1).month_index(), 11);
    }

    #[test]
    #[should_panic(expected = "invalid month/day")]
    fn test_month_day_new_asserts() {
        let _ = MonthDay::new(0, 5);
    }

    #[test]
    fn test_calendar_date_leap_years() {
        assert!(CalendarDate::new(2024, 2, 29).is_some());
        assert!(CalendarDate::new(2026, 2, 29).is_none());
        assert!(CalendarDate::new(2000, 2, 29).is_some());
        assert!(CalendarDate::new(1900, 2, 29).is_none());
    }

    #[test]
    fn test_calendar_date_parse() {
        assert_eq!(
            CalendarDate::parse("2026-10-19"),
            CalendarDate::new(2026, 10, 19)
        );
        assert!(CalendarDate::parse("2026-13-01").is_none());
        assert!(CalendarDate::parse("not a date").is_none());
    }

    #[test]
    fn test_fixed_clock() {
        let date = CalendarDate::new(2026, 3, 21).unwrap();
        let clock = FixedClock::on(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().time.second, 0);
    }

    #[test]
    fn test_system_clock_is_recent() {
        let today = SystemClock::new(0).today();
        assert!(today.year >= 2024, "clock should be in the 2020s: {today}");
    }
}
