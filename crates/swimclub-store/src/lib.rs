//! `RocksDB` storage layer for swimclub.
//!
//! This crate provides persistent storage for users, content, social
//! relations, activity records, the points ledger, and leaderboard records
//! using `RocksDB` with column families for efficient indexing.
//!
//! # Consistency model
//!
//! There are no multi-document transactions in the domain model; instead,
//! every logical action that touches more than one record (a like plus its
//! counter, a follow plus two counters, a task completion plus its ledger
//! entries) is a single compound operation here, applied as one
//! `WriteBatch` while holding the store's mutation lock. Uniqueness
//! constraints are the keys themselves: a duplicate daily-task award or a
//! duplicate like cannot be inserted because its identifying tuple is its
//! storage key.
//!
//! # Example
//!
//! ```no_run
//! use swimclub_store::{RocksStore, Store};
//! use swimclub_core::User;
//!
//! let store = RocksStore::open("/tmp/swimclub-db").unwrap();
//!
//! let user = User::new("wx-openid-1", "swimmer");
//! store.put_user(&user).unwrap();
//!
//! let found = store.find_user_by_open_id("wx-openid-1").unwrap();
//! assert!(found.is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, NaiveDate, Utc};

use swimclub_core::{
    ActivityRecord, Comment, CommentId, CounterField, LikeTarget, Moment, MomentId, PointsAccount,
    PointsHistoryEntry, RankType, RankingRecord, Region, TaskStatus, TaskType, User, UserId,
};

/// A content entity carrying denormalized counters.
#[derive(Debug, Clone)]
pub enum CounterEntity {
    /// A feed post.
    Moment(Moment),
    /// A comment.
    Comment(Comment),
}

impl CounterEntity {
    /// The entity's current like count.
    #[must_use]
    pub const fn like_count(&self) -> i64 {
        match self {
            Self::Moment(m) => m.like_count,
            Self::Comment(c) => c.like_count,
        }
    }
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy)]
pub struct LikeOutcome {
    /// `true` when the toggle placed a like, `false` when it retracted one.
    pub liked: bool,
    /// The target's like count after the toggle.
    pub like_count: i64,
}

/// Result of a daily-task completion attempt.
#[derive(Debug, Clone, Copy)]
pub enum TaskOutcome {
    /// The task was completed for the first time today; points were awarded.
    Awarded {
        /// Points paid out for the task.
        points: i64,
        /// The account total after the award.
        total_points: i64,
    },
    /// The task was already completed today; nothing changed.
    AlreadyCompleted,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g. `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert or update a user profile (maintains the `open_id` index).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Look up a user by external identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_user_by_open_id(&self, open_id: &str) -> Result<Option<User>>;

    /// Atomically adjust a user's denormalized follow counters.
    ///
    /// Counters are clamped at zero. Returns the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn update_follow_counters(
        &self,
        user_id: &UserId,
        followers_delta: i64,
        following_delta: i64,
    ) -> Result<User>;

    // =========================================================================
    // Moment Operations
    // =========================================================================

    /// Insert or update a moment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_moment(&self, moment: &Moment) -> Result<()>;

    /// Get a moment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_moment(&self, moment_id: &MomentId) -> Result<Option<Moment>>;

    /// List non-deleted moments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_moments(&self, limit: usize, offset: usize) -> Result<Vec<Moment>>;

    /// Soft-delete a moment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the moment doesn't exist.
    fn soft_delete_moment(&self, moment_id: &MomentId) -> Result<()>;

    // =========================================================================
    // Comment Operations
    // =========================================================================

    /// Insert a comment and bump the parent moment's comment counter in one
    /// batch. Returns the updated moment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the parent moment doesn't exist or
    /// is deleted.
    fn create_comment(&self, comment: &Comment) -> Result<Moment>;

    /// Get a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_comment(&self, comment_id: &CommentId) -> Result<Option<Comment>>;

    /// List non-deleted comments on a moment, newest first, with the total
    /// count of matching comments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_comments(
        &self,
        moment_id: &MomentId,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Comment>, usize)>;

    /// Soft-delete a comment and decrement the parent moment's comment
    /// counter in one batch.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the comment doesn't exist.
    fn soft_delete_comment(&self, comment_id: &CommentId) -> Result<()>;

    // =========================================================================
    // Counter Ledger
    // =========================================================================

    /// Apply an atomic increment/decrement to a counter on a content
    /// entity and return the updated entity.
    ///
    /// Counters clamp at zero; this is the only path that moves them.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the target doesn't exist.
    /// - `StoreError::MissingCounter` for a comment counter on a comment.
    fn adjust_counter(
        &self,
        target: LikeTarget,
        field: CounterField,
        delta: i64,
    ) -> Result<CounterEntity>;

    // =========================================================================
    // Like Operations
    // =========================================================================

    /// Toggle a like: insert the like row and bump the counter, or remove
    /// the row and drop the counter, in one batch.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the target doesn't exist.
    fn toggle_like(&self, user_id: &UserId, target: LikeTarget) -> Result<LikeOutcome>;

    /// Check whether a user has an active like on a target.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn has_liked(&self, user_id: &UserId, target: LikeTarget) -> Result<bool>;

    // =========================================================================
    // Relation Operations
    // =========================================================================

    /// Follow a user: tombstone-aware upsert of the relation plus both
    /// follow counters, in one batch.
    ///
    /// Idempotent: re-following while already active changes nothing and
    /// returns `false`. Returns `true` when the active state flipped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if either user doesn't exist.
    fn follow(&self, from_user: &UserId, to_user: &UserId) -> Result<bool>;

    /// Unfollow a user: tombstone the relation and decrement both counters
    /// in one batch. No-op (returning `false`) when no active follow exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if either user doesn't exist.
    fn unfollow(&self, from_user: &UserId, to_user: &UserId) -> Result<bool>;

    /// Upsert an active block relation. Returns `true` when the state flipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn block(&self, from_user: &UserId, to_user: &UserId) -> Result<bool>;

    /// Tombstone a block relation. Returns `true` when the state flipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn unblock(&self, from_user: &UserId, to_user: &UserId) -> Result<bool>;

    /// Whether an active follow exists from one user to another.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn is_following(&self, from_user: &UserId, to_user: &UserId) -> Result<bool>;

    /// Whether an active block exists from one user to another.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn is_blocked(&self, from_user: &UserId, to_user: &UserId) -> Result<bool>;

    /// Users actively following the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_followers(&self, user_id: &UserId) -> Result<Vec<UserId>>;

    /// Users the given user actively follows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_following(&self, user_id: &UserId) -> Result<Vec<UserId>>;

    /// Users the given user actively blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_blocked(&self, user_id: &UserId) -> Result<Vec<UserId>>;

    // =========================================================================
    // Activity Operations
    // =========================================================================

    /// Insert an activity record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_activity(&self, record: &ActivityRecord) -> Result<()>;

    /// The user's most recent activity record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn latest_activity(&self, user_id: &UserId) -> Result<Option<ActivityRecord>>;

    /// Sum of the user's recorded distance within one server-local calendar
    /// day.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn sum_distance_for_day(&self, user_id: &UserId, day: NaiveDate) -> Result<i64>;

    /// The user's activity records with `recorded_at` at or after `since`,
    /// oldest first. `None` reads the whole history.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_activities_since(
        &self,
        user_id: &UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityRecord>>;

    // =========================================================================
    // Points Ledger & Daily Task Tracker
    // =========================================================================

    /// Get the user's points account, creating an empty one on first read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_or_create_points_account(&self, user_id: &UserId) -> Result<PointsAccount>;

    /// Complete a daily task.
    ///
    /// Atomic conditional insert on the `(user, task, server-local day)`
    /// key: if a completion already exists within the day window the call is
    /// an idempotent no-op; otherwise one batch writes the completion
    /// record, appends the points-history entry, and increments the points
    /// account plus the user's denormalized total.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn complete_daily_task(
        &self,
        user_id: &UserId,
        task_type: TaskType,
        now: DateTime<Utc>,
    ) -> Result<TaskOutcome>;

    /// The user's points history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_points_history(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PointsHistoryEntry>>;

    /// The daily-task checklist for the day containing `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn daily_task_statuses(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<Vec<TaskStatus>>;

    // =========================================================================
    // Leaderboard Operations
    // =========================================================================

    /// Upsert-increment a user's stats for one leaderboard dimension.
    ///
    /// Creates the record (with the supplied region, or an empty one) when
    /// absent; otherwise increments `total_distance` and, when requested,
    /// `activity_count`. A supplied region overwrites the stored one; region
    /// fields are never incremented. Returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn update_user_stats(
        &self,
        user_id: &UserId,
        rank_type: RankType,
        distance: i64,
        increment_activity_count: bool,
        region: Option<&Region>,
    ) -> Result<RankingRecord>;

    /// Get a user's ranking record for one dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_ranking(&self, user_id: &UserId, rank_type: RankType) -> Result<Option<RankingRecord>>;

    /// Recompute ranks for one dimension: read every record, sort by
    /// `total_distance` descending, assign `rank = position + 1`, and
    /// persist all ranks in one batch.
    ///
    /// Safe to run concurrently with further stat updates; a stat landing
    /// mid-pass is converged by the next recompute.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn update_all_ranks(&self, rank_type: RankType) -> Result<()>;

    /// The top records of a dimension by cached rank, ascending. Records
    /// never touched by a recompute pass sort last.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn top_rankings(&self, rank_type: RankType, limit: usize) -> Result<Vec<RankingRecord>>;

    /// Records of a dimension filtered by region, by cached rank ascending.
    ///
    /// An exact `city_code` match is preferred when supplied; otherwise the
    /// city string is matched modulo a trailing "市" suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn regional_rankings(
        &self,
        rank_type: RankType,
        city: &str,
        city_code: Option<&str>,
    ) -> Result<Vec<RankingRecord>>;
}
