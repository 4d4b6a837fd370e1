//! Core types and utilities for swimclub.
//!
//! This crate provides the foundational types used throughout the swimclub
//! backend:
//!
//! - **Identifiers**: `UserId`, `MomentId`, `CommentId`, `RecordId`, `EntryId`
//! - **Users**: `User`, `Region`
//! - **Content**: `Moment`, `Comment`
//! - **Social graph**: `Relation`, `RelationKind`, `LikeRecord`, `LikeTarget`
//! - **Points**: `TaskType`, `PointsAccount`, `PointsHistoryEntry`,
//!   `DailyTaskRecord`
//! - **Leaderboards**: `RankType`, `RankingRecord`
//!
//! # Counters
//!
//! Denormalized counters (`like_count`, `followers`, `points`, ranking
//! totals) are plain `i64` fields moved only through the storage layer's
//! atomic adjustments, never read-modify-written from application memory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod activity;
pub mod content;
pub mod ids;
pub mod points;
pub mod ranking;
pub mod social;
pub mod user;

pub use activity::{ActivityRecord, ActivityStats, ParseStatsPeriodError, StatsPeriod};
pub use content::{Comment, Moment};
pub use ids::{CommentId, EntryId, IdError, MomentId, RecordId, UserId};
pub use points::{
    day_key, local_day, DailyTaskRecord, ParseTaskTypeError, PointsAccount, PointsHistoryEntry,
    TaskStatus, TaskType, DISTANCE_MILESTONES, POST_STATUS_POINTS, SHARE_DATA_POINTS,
    SWIM_1000M_POINTS, SWIM_500M_POINTS,
};
pub use ranking::{ParseRankTypeError, RankType, RankingRecord, Region};
pub use social::{CounterField, LikeRecord, LikeTarget, Relation, RelationKind};
pub use user::User;
