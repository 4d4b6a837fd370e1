//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary user profiles, keyed by `user_id`.
    pub const USERS: &str = "users";

    /// Index: user lookup by external identity, keyed by `open_id`.
    /// Value is the 16-byte `user_id`.
    pub const USERS_BY_OPEN_ID: &str = "users_by_open_id";

    /// Feed posts, keyed by `moment_id`.
    pub const MOMENTS: &str = "moments";

    /// Comments, keyed by `comment_id`.
    pub const COMMENTS: &str = "comments";

    /// Index: comments by moment, keyed by `moment_id || comment_id`.
    /// Value is empty (index only).
    pub const COMMENTS_BY_MOMENT: &str = "comments_by_moment";

    /// Like rows, keyed by `user_id || target_tag || target_id`.
    /// The key is the uniqueness constraint on `(user, target, type)`.
    pub const LIKES: &str = "likes";

    /// Relation rows, keyed by `from_user || to_user || kind_tag`.
    /// The key is the uniqueness constraint on `(from, to, kind)`.
    pub const RELATIONS: &str = "relations";

    /// Index: relations by target, keyed by `to_user || from_user || kind_tag`.
    /// Value is empty (index only); used for follower listings.
    pub const RELATIONS_BY_TARGET: &str = "relations_by_target";

    /// Activity records, keyed by `user_id || record_id` (ULID), so a
    /// user's records iterate chronologically.
    pub const ACTIVITIES: &str = "activities";

    /// Points accounts, keyed by `user_id`.
    pub const POINTS_ACCOUNTS: &str = "points_accounts";

    /// Append-only points ledger, keyed by `user_id || entry_id` (ULID).
    pub const POINTS_HISTORY: &str = "points_history";

    /// Daily task completions, keyed by `user_id || task_tag || day`.
    /// The key is the uniqueness constraint on `(user, task, calendar day)`
    /// that gates duplicate awards.
    pub const DAILY_TASKS: &str = "daily_tasks";

    /// Ranking records, keyed by `rank_type_tag || user_id`, so one
    /// leaderboard dimension is a single prefix scan.
    pub const RANKINGS: &str = "rankings";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::USERS,
        cf::USERS_BY_OPEN_ID,
        cf::MOMENTS,
        cf::COMMENTS,
        cf::COMMENTS_BY_MOMENT,
        cf::LIKES,
        cf::RELATIONS,
        cf::RELATIONS_BY_TARGET,
        cf::ACTIVITIES,
        cf::POINTS_ACCOUNTS,
        cf::POINTS_HISTORY,
        cf::DAILY_TASKS,
        cf::RANKINGS,
    ]
}
