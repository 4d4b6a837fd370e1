//! Social graph and interaction types.
//!
//! Relations are tombstoned rather than deleted so re-follow is an
//! idempotent upsert. Like records are physically removed on unlike.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CommentId, MomentId, UserId};

/// Kind of a directed user relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// `from_user` follows `to_user`.
    Follow,
    /// `from_user` blocks `to_user`.
    Block,
}

impl RelationKind {
    /// Stable single-byte tag used in storage keys.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Follow => 0,
            Self::Block => 1,
        }
    }
}

/// A directed relation between two users.
///
/// Uniqueness: one row per `(from_user, to_user, kind)`. Unfollow/unblock
/// set `tombstoned` instead of deleting the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// The acting user.
    pub from_user: UserId,

    /// The target user.
    pub to_user: UserId,

    /// Follow or block.
    pub kind: RelationKind,

    /// Soft-delete flag; a tombstoned relation is inactive.
    pub tombstoned: bool,

    /// When the relation row was first created.
    pub created_at: DateTime<Utc>,

    /// When the relation last changed state.
    pub updated_at: DateTime<Utc>,
}

impl Relation {
    /// Create a new active relation.
    #[must_use]
    pub fn new(from_user: UserId, to_user: UserId, kind: RelationKind) -> Self {
        let now = Utc::now();
        Self {
            from_user,
            to_user,
            kind,
            tombstoned: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the relation is currently in effect.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.tombstoned
    }
}

/// The target of a like: a moment or a comment.
///
/// A closed enum instead of an id-plus-type-string pair, so every counter
/// touch point handles both cases exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target_type", content = "target_id", rename_all = "lowercase")]
pub enum LikeTarget {
    /// A feed post.
    Moment(MomentId),
    /// A comment.
    Comment(CommentId),
}

impl LikeTarget {
    /// Stable single-byte tag used in storage keys.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Moment(_) => 0,
            Self::Comment(_) => 1,
        }
    }

    /// The raw 16 identifier bytes of the target.
    #[must_use]
    pub fn id_bytes(self) -> [u8; 16] {
        match self {
            Self::Moment(id) => *id.as_uuid().as_bytes(),
            Self::Comment(id) => *id.as_uuid().as_bytes(),
        }
    }
}

/// A like row: at most one per `(user, target)`, enforced by the storage
/// key. Created on like, physically removed on unlike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeRecord {
    /// The liking user.
    pub user_id: UserId,

    /// What was liked.
    pub target: LikeTarget,

    /// When the like was placed.
    pub created_at: DateTime<Utc>,
}

impl LikeRecord {
    /// Create a like placed now.
    #[must_use]
    pub fn new(user_id: UserId, target: LikeTarget) -> Self {
        Self {
            user_id,
            target,
            created_at: Utc::now(),
        }
    }
}

/// A denormalized counter field on a content entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterField {
    /// The like counter.
    Likes,
    /// The comment counter.
    Comments,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_relation_is_active() {
        let rel = Relation::new(UserId::generate(), UserId::generate(), RelationKind::Follow);
        assert!(rel.is_active());
    }

    #[test]
    fn like_target_serde_shape() {
        let target = LikeTarget::Moment(MomentId::generate());
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["target_type"], "moment");
        assert!(json["target_id"].is_string());
    }

    #[test]
    fn like_target_tags_differ() {
        let moment = LikeTarget::Moment(MomentId::generate());
        let comment = LikeTarget::Comment(CommentId::generate());
        assert_ne!(moment.tag(), comment.tag());
    }
}
