//! Points ledger and daily-task types.
//!
//! Points are awarded for daily tasks: distance milestones evaluated from
//! same-day activity sums, and content actions (posting, sharing). A task
//! pays out at most once per calendar day per user, where calendar days are
//! bounded by server-local midnight.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{EntryId, UserId};

// ============================================================================
// Reward table
// ============================================================================

/// Points awarded for the 500m daily swim milestone.
pub const SWIM_500M_POINTS: i64 = 50;

/// Points awarded for the 1000m daily swim milestone.
pub const SWIM_1000M_POINTS: i64 = 100;

/// Points awarded for posting a moment.
pub const POST_STATUS_POINTS: i64 = 20;

/// Points awarded for sharing swim data.
pub const SHARE_DATA_POINTS: i64 = 30;

/// Distance milestones in meters, paired with the task they unlock.
///
/// Crossing a higher threshold does not skip a lower one; each entry is
/// awarded independently, gated by its own daily uniqueness key.
pub const DISTANCE_MILESTONES: [(i64, TaskType); 2] = [
    (500, TaskType::Swim500m),
    (1000, TaskType::Swim1000m),
];

/// A daily task eligible for a points award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Swim 500 meters in one day.
    #[serde(rename = "SWIM_500M")]
    Swim500m,

    /// Swim 1000 meters in one day.
    #[serde(rename = "SWIM_1000M")]
    Swim1000m,

    /// Post a moment to the feed.
    #[serde(rename = "POST_STATUS")]
    PostStatus,

    /// Share swim data.
    #[serde(rename = "SHARE_DATA")]
    ShareData,
}

impl TaskType {
    /// All task types, in storage-tag order.
    pub const ALL: [Self; 4] = [
        Self::Swim500m,
        Self::Swim1000m,
        Self::PostStatus,
        Self::ShareData,
    ];

    /// Stable single-byte tag used in storage keys.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Swim500m => 0,
            Self::Swim1000m => 1,
            Self::PostStatus => 2,
            Self::ShareData => 3,
        }
    }

    /// Points paid out when the task completes.
    #[must_use]
    pub const fn points(self) -> i64 {
        match self {
            Self::Swim500m => SWIM_500M_POINTS,
            Self::Swim1000m => SWIM_1000M_POINTS,
            Self::PostStatus => POST_STATUS_POINTS,
            Self::ShareData => SHARE_DATA_POINTS,
        }
    }

    /// Human-readable task description shown in the client.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Swim500m => "游泳距离达到500米",
            Self::Swim1000m => "游泳距离达到1000米",
            Self::PostStatus => "发布动态",
            Self::ShareData => "分享游泳数据",
        }
    }

    /// Wire name of the task (matches the request-body `type` values).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Swim500m => "SWIM_500M",
            Self::Swim1000m => "SWIM_1000M",
            Self::PostStatus => "POST_STATUS",
            Self::ShareData => "SHARE_DATA",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ParseTaskTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SWIM_500M" => Ok(Self::Swim500m),
            "SWIM_1000M" => Ok(Self::Swim1000m),
            "POST_STATUS" => Ok(Self::PostStatus),
            "SHARE_DATA" => Ok(Self::ShareData),
            _ => Err(ParseTaskTypeError(s.to_string())),
        }
    }
}

/// Error returned when a task type string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task type: {0}")]
pub struct ParseTaskTypeError(pub String);

// ============================================================================
// Ledger records
// ============================================================================

/// A user's points account: one per user, created lazily on first read or
/// first award.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsAccount {
    /// The account owner.
    pub user_id: UserId,

    /// Current total. Incremented atomically alongside each history entry.
    pub total_points: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl PointsAccount {
    /// Create an empty account for a user.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            total_points: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An append-only points ledger row.
///
/// Never mutated or deleted; the history is the audit source of truth for
/// `PointsAccount::total_points`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsHistoryEntry {
    /// Entry identifier (time-ordered).
    pub id: EntryId,

    /// The awarded user.
    pub user_id: UserId,

    /// The task that triggered the award.
    pub task_type: TaskType,

    /// Points awarded.
    pub points: i64,

    /// When the award happened.
    pub created_at: DateTime<Utc>,
}

/// The de-duplication gate for points awards.
///
/// At most one record exists per `(user, task, server-local calendar day)`;
/// the storage key enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTaskRecord {
    /// The completing user.
    pub user_id: UserId,

    /// The completed task.
    pub task_type: TaskType,

    /// When the task completed.
    pub completed_at: DateTime<Utc>,

    /// Points awarded at completion time.
    pub points: i64,
}

/// One row of the daily-task checklist returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    /// The task.
    #[serde(rename = "type")]
    pub task_type: TaskType,

    /// Points the task pays out.
    pub points: i64,

    /// Task description.
    pub description: String,

    /// Whether the user completed the task today.
    pub completed: bool,
}

// ============================================================================
// Calendar days
// ============================================================================

/// The server-local calendar day containing `at`.
///
/// Daily-task gating and same-day distance sums bucket on server-local
/// midnight; time zones of the acting user are deliberately ignored.
#[must_use]
pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Encode a day as its `YYYYMMDD` ordinal-free integer form, suitable for a
/// fixed-width big-endian storage key component.
#[must_use]
pub fn day_key(day: NaiveDate) -> u32 {
    let y = u32::try_from(day.year()).unwrap_or(0);
    y * 10_000 + day.month() * 100 + day.day()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn task_type_roundtrip() {
        for task in TaskType::ALL {
            assert_eq!(task.as_str().parse::<TaskType>().unwrap(), task);
        }
    }

    #[test]
    fn task_type_serde_uses_wire_names() {
        let json = serde_json::to_string(&TaskType::Swim500m).unwrap();
        assert_eq!(json, "\"SWIM_500M\"");
        let parsed: TaskType = serde_json::from_str("\"SHARE_DATA\"").unwrap();
        assert_eq!(parsed, TaskType::ShareData);
    }

    #[test]
    fn reward_table() {
        assert_eq!(TaskType::Swim500m.points(), 50);
        assert_eq!(TaskType::Swim1000m.points(), 100);
        assert_eq!(TaskType::PostStatus.points(), 20);
        assert_eq!(TaskType::ShareData.points(), 30);
    }

    #[test]
    fn milestones_are_ascending() {
        assert!(DISTANCE_MILESTONES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn day_key_is_ordered() {
        let a = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let c = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert!(day_key(a) < day_key(b));
        assert!(day_key(b) < day_key(c));
    }

    #[test]
    fn same_instant_same_day() {
        let at = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(local_day(at), local_day(at));
    }

    #[test]
    fn new_points_account_is_empty() {
        let account = PointsAccount::new(UserId::generate());
        assert_eq!(account.total_points, 0);
    }
}
