//! User profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Region, UserId};

/// A user profile.
///
/// `followers`, `following`, and `points` are denormalized projections of
/// the relation set and the points ledger, maintained by explicit counter
/// adjustments rather than derived on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID.
    pub id: UserId,

    /// External identity (e.g. the WeChat `openid`), unique per user.
    pub open_id: String,

    /// Display name.
    pub nickname: String,

    /// Avatar URL, if set.
    pub avatar_url: Option<String>,

    /// Administrative region of the user's profile.
    pub region: Region,

    /// Number of active followers.
    pub followers: i64,

    /// Number of users this user actively follows.
    pub following: i64,

    /// Denormalized points total, mirroring the points account.
    pub points: i64,

    /// When the profile was created.
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh profile with zeroed counters.
    #[must_use]
    pub fn new(open_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            open_id: open_id.into(),
            nickname: nickname.into(),
            avatar_url: None,
            region: Region::default(),
            followers: 0,
            following: 0,
            points: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_has_zero_counters() {
        let user = User::new("wx-open-id", "swimmer");
        assert_eq!(user.followers, 0);
        assert_eq!(user.following, 0);
        assert_eq!(user.points, 0);
    }
}
