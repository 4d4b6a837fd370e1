//! Feed content types: moments and comments.
//!
//! Both carry denormalized `like_count`/`comment_count` counters. Counters
//! move only through the storage layer's atomic adjustment and are clamped
//! at zero; they are never recomputed from the like/comment rows on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CommentId, MomentId, UserId};

/// A feed post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    /// The moment ID.
    pub id: MomentId,

    /// The posting user.
    pub author: UserId,

    /// Post body.
    pub content: String,

    /// Attached image URLs.
    pub images: Vec<String>,

    /// Number of active likes.
    pub like_count: i64,

    /// Number of non-deleted comments.
    pub comment_count: i64,

    /// Soft-delete flag.
    pub is_deleted: bool,

    /// When the moment was posted.
    pub created_at: DateTime<Utc>,

    /// When the moment was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Moment {
    /// Create a new moment with zeroed counters.
    #[must_use]
    pub fn new(author: UserId, content: impl Into<String>, images: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: MomentId::generate(),
            author,
            content: content.into(),
            images,
            like_count: 0,
            comment_count: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A comment on a moment, optionally replying to another comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// The comment ID.
    pub id: CommentId,

    /// The moment this comment belongs to.
    pub moment_id: MomentId,

    /// The commenting user.
    pub author: UserId,

    /// Comment body.
    pub content: String,

    /// The comment being replied to, if any.
    pub reply_to: Option<CommentId>,

    /// Number of active likes.
    pub like_count: i64,

    /// Soft-delete flag.
    pub is_deleted: bool,

    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment.
    #[must_use]
    pub fn new(
        moment_id: MomentId,
        author: UserId,
        content: impl Into<String>,
        reply_to: Option<CommentId>,
    ) -> Self {
        Self {
            id: CommentId::generate(),
            moment_id,
            author,
            content: content.into(),
            reply_to,
            like_count: 0,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_moment_has_zero_counters() {
        let moment = Moment::new(UserId::generate(), "first swim of the season", vec![]);
        assert_eq!(moment.like_count, 0);
        assert_eq!(moment.comment_count, 0);
        assert!(!moment.is_deleted);
    }
}
