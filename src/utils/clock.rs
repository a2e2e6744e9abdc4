//! Wall-clock helpers
//!
//! All functions take "now" explicitly so the engine stays deterministic.
//! Local time is carried as a `DateTime<FixedOffset>`: the offset captured
//! when the caller sampled the clock defines the local wall-clock.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Days, FixedOffset, Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Milliseconds since the Unix epoch
pub type EpochMs = i64;

/// A sampled local wall-clock instant
pub type LocalTime = DateTime<FixedOffset>;

const MS_PER_DAY: i64 = 86_400_000;

/// Sample the host's local clock
pub fn local_now() -> LocalTime {
    Local::now().fixed_offset()
}

/// A 24-hour "HH:MM" wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// True when `now` falls inside this hour and minute
    pub fn matches(&self, now: &LocalTime) -> bool {
        now.hour() == self.hour && now.minute() == self.minute
    }

    fn naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl FromStr for TimeOfDay {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::invalid(format!("expected HH:MM, got {:?}", s));

        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;

        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Next epoch timestamp strictly after `now` whose local wall-clock reads `target`.
///
/// Seconds and milliseconds of the result are zero. A target equal to or
/// earlier than `now` lands on the following calendar day.
pub fn next_occurrence(target: TimeOfDay, now: &LocalTime) -> EpochMs {
    let wall = now.naive_local();
    let mut next = wall.date().and_time(target.naive_time());
    if next <= wall {
        next = next.checked_add_days(Days::new(1)).unwrap_or(next);
    }

    // a fixed offset maps every wall-clock time to exactly one instant
    next
        .and_local_timezone(*now.offset())
        .single()
        .map_or(now.timestamp_millis() + MS_PER_DAY, |at| at.timestamp_millis())
}

/// Milliseconds from `now` until the next occurrence of `target`
pub fn remaining_until(target: TimeOfDay, now: &LocalTime) -> u64 {
    remaining_from(next_occurrence(target, now), now)
}

/// Milliseconds from `now` until `deadline`, clamped at zero
pub fn remaining_from(deadline: EpochMs, now: &LocalTime) -> u64 {
    u64::try_from(deadline - now.timestamp_millis()).unwrap_or(0)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{FixedOffset, TimeZone};

    use super::LocalTime;

    /// A fixed local instant at UTC+02:00
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> LocalTime {
        FixedOffset::east_opt(2 * 3600)
            .and_then(|tz| tz.with_ymd_and_hms(year, month, day, hour, minute, second).single())
            .expect("valid test time")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::at;
    use super::*;

    fn tod(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats_hhmm() {
        assert_eq!(tod("07:05"), TimeOfDay::new(7, 5).unwrap());
        assert_eq!(tod("7:05").to_string(), "07:05");
        assert_eq!(tod("23:59").to_string(), "23:59");
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "24:00", "12:60", "12", "12:5", "ab:cd", "123:00", ":30"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn midnight_from_late_evening_is_next_day() {
        let now = at(2024, 3, 10, 23, 59, 0);
        let next = next_occurrence(tod("00:00"), &now);

        assert_eq!(next, at(2024, 3, 11, 0, 0, 0).timestamp_millis());
        assert_eq!(remaining_until(tod("00:00"), &now), 60_000);
    }

    #[test]
    fn later_today_stays_today() {
        let now = at(2024, 3, 10, 8, 15, 30);
        let next = next_occurrence(tod("09:00"), &now);

        assert_eq!(next, at(2024, 3, 10, 9, 0, 0).timestamp_millis());
    }

    #[test]
    fn current_minute_rolls_over_a_full_day() {
        let now = at(2024, 3, 10, 9, 0, 0);
        let next = next_occurrence(tod("09:00"), &now);

        assert_eq!(next, at(2024, 3, 11, 9, 0, 0).timestamp_millis());

        let later_in_minute = at(2024, 3, 10, 9, 0, 40);
        assert_eq!(
            next_occurrence(tod("09:00"), &later_in_minute),
            at(2024, 3, 11, 9, 0, 0).timestamp_millis()
        );
    }

    #[test]
    fn rollover_crosses_month_and_year_ends() {
        let now = at(2023, 12, 31, 22, 15, 0) + chrono::Duration::milliseconds(250);

        assert_eq!(
            next_occurrence(tod("07:00"), &now),
            at(2024, 1, 1, 7, 0, 0).timestamp_millis()
        );
        assert_eq!(
            next_occurrence(tod("23:00"), &now),
            at(2023, 12, 31, 23, 0, 0).timestamp_millis()
        );
    }

    #[test]
    fn remaining_is_never_negative() {
        let now = at(2024, 3, 10, 12, 0, 0);
        assert_eq!(remaining_from(now.timestamp_millis() - 5_000, &now), 0);
        assert_eq!(remaining_from(now.timestamp_millis() + 5_000, &now), 5_000);
    }

    #[test]
    fn matches_hour_and_minute_only() {
        let target = tod("06:30");
        assert!(target.matches(&at(2024, 1, 1, 6, 30, 0)));
        assert!(target.matches(&at(2024, 1, 1, 6, 30, 59)));
        assert!(!target.matches(&at(2024, 1, 1, 6, 31, 0)));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&tod("18:45")).unwrap();
        assert_eq!(json, "\"18:45\"");
        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }
}
