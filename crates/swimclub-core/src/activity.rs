//! Swim activity records.

use chrono::{DateTime, Datelike, Days, Local, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{RecordId, UserId};

/// A recorded swim session.
///
/// Records are append-only; the leaderboard and milestone paths consume
/// them at creation time and never mutate them afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// The record ID (time-ordered).
    pub id: RecordId,

    /// The swimming user.
    pub user_id: UserId,

    /// The user's external identity at recording time.
    pub open_id: String,

    /// Distance swum, in meters.
    pub distance_m: i64,

    /// Session duration, in minutes.
    pub duration_min: i64,

    /// Estimated calories burned.
    pub calories: i64,

    /// Pool length in meters, when reported by the device.
    pub pool_length_m: Option<i64>,

    /// When the session happened.
    pub recorded_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Create a record stamped now.
    #[must_use]
    pub fn new(user_id: UserId, open_id: impl Into<String>, distance_m: i64) -> Self {
        Self {
            id: RecordId::generate(),
            user_id,
            open_id: open_id.into(),
            distance_m,
            duration_min: 0,
            calories: 0,
            pool_length_m: None,
            recorded_at: Utc::now(),
        }
    }
}

/// Aggregate totals over a set of activity records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStats {
    /// Total distance swum, in meters.
    pub total_distance_m: i64,

    /// Total session time, in minutes.
    pub total_duration_min: i64,

    /// Total estimated calories burned.
    pub total_calories: i64,

    /// Number of recorded sessions.
    pub activity_count: i64,
}

impl ActivityStats {
    /// Sum a set of records into one stats row.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ActivityRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total_distance_m += record.distance_m;
            stats.total_duration_min += record.duration_min;
            stats.total_calories += record.calories;
            stats.activity_count += 1;
        }
        stats
    }
}

/// A reporting window for activity reads.
///
/// Calendar windows are anchored to server-local time, matching the
/// daily-task day bucketing: `Day` starts at local midnight, `Week` on the
/// local Monday, `Month` and `Year` on the first local day of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    /// The current local calendar day.
    Day,
    /// The current local ISO week (Monday start).
    Week,
    /// The current local calendar month.
    Month,
    /// The current local calendar year.
    Year,
    /// All recorded history.
    Total,
}

impl StatsPeriod {
    /// All reporting windows, shortest first.
    pub const ALL: [Self; 5] = [Self::Day, Self::Week, Self::Month, Self::Year, Self::Total];

    /// Start of the window containing `now`, or `None` for the unbounded
    /// all-time window.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.with_timezone(&Local).date_naive();
        let first_day = match self {
            Self::Day => today,
            Self::Week => {
                let back = u64::from(today.weekday().num_days_from_monday());
                today.checked_sub_days(Days::new(back)).unwrap_or(today)
            }
            Self::Month => today.with_day(1).unwrap_or(today),
            Self::Year => today.with_ordinal(1).unwrap_or(today),
            Self::Total => return None,
        };

        let midnight = first_day.and_time(NaiveTime::MIN);
        Some(
            midnight
                .and_local_timezone(Local)
                .earliest()
                .map_or_else(|| midnight.and_utc(), |local| local.with_timezone(&Utc)),
        )
    }

    /// Wire name of the window (matches the query-string `period` values).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Total => "total",
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatsPeriod {
    type Err = ParseStatsPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "total" => Ok(Self::Total),
            _ => Err(ParseStatsPeriodError(s.to_string())),
        }
    }
}

/// Error returned when a stats period string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stats period: {0}")]
pub struct ParseStatsPeriodError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    fn record(distance_m: i64, duration_min: i64, calories: i64) -> ActivityRecord {
        let mut r = ActivityRecord::new(UserId::generate(), "wx-1", distance_m);
        r.duration_min = duration_min;
        r.calories = calories;
        r
    }

    #[test]
    fn stats_sum_all_fields() {
        let records = vec![record(1000, 30, 200), record(500, 15, 100)];
        let stats = ActivityStats::from_records(&records);

        assert_eq!(stats.total_distance_m, 1500);
        assert_eq!(stats.total_duration_min, 45);
        assert_eq!(stats.total_calories, 300);
        assert_eq!(stats.activity_count, 2);
    }

    #[test]
    fn stats_of_nothing_are_zero() {
        assert_eq!(ActivityStats::from_records([]), ActivityStats::default());
    }

    #[test]
    fn period_roundtrip() {
        for period in StatsPeriod::ALL {
            assert_eq!(period.as_str().parse::<StatsPeriod>().unwrap(), period);
        }
        assert!("decade".parse::<StatsPeriod>().is_err());
    }

    #[test]
    fn window_starts_nest() {
        let now = Utc::now();

        assert_eq!(StatsPeriod::Total.start(now), None);

        let day = StatsPeriod::Day.start(now).unwrap();
        let week = StatsPeriod::Week.start(now).unwrap();
        let month = StatsPeriod::Month.start(now).unwrap();
        let year = StatsPeriod::Year.start(now).unwrap();

        assert!(day <= now);
        assert!(week <= day);
        assert!(month <= day);
        assert!(year <= month);
    }
}
