//! Key encoding utilities for `RocksDB`.
//!
//! Composite keys double as uniqueness constraints: a like, a relation, or a
//! daily-task completion cannot exist twice because its identifying tuple is
//! its key.

use chrono::NaiveDate;

use swimclub_core::{
    day_key, CommentId, EntryId, LikeTarget, MomentId, RankType, RecordId, RelationKind, TaskType,
    UserId,
};

/// Create a user key from a user ID.
#[must_use]
pub fn user_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create an external-identity index key from an `open_id`.
#[must_use]
pub fn open_id_key(open_id: &str) -> Vec<u8> {
    open_id.as_bytes().to_vec()
}

/// Create a moment key from a moment ID.
#[must_use]
pub fn moment_key(moment_id: &MomentId) -> Vec<u8> {
    moment_id.as_bytes().to_vec()
}

/// Create a comment key from a comment ID.
#[must_use]
pub fn comment_key(comment_id: &CommentId) -> Vec<u8> {
    comment_id.as_bytes().to_vec()
}

/// Create a moment-comment index key.
///
/// Format: `moment_id (16 bytes) || comment_id (16 bytes)`
#[must_use]
pub fn moment_comment_key(moment_id: &MomentId, comment_id: &CommentId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(moment_id.as_bytes());
    key.extend_from_slice(comment_id.as_bytes());
    key
}

/// Create a prefix for iterating all comments on a moment.
#[must_use]
pub fn moment_comments_prefix(moment_id: &MomentId) -> Vec<u8> {
    moment_id.as_bytes().to_vec()
}

/// Extract the comment ID from a moment-comment index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_comment_id_from_moment_key(key: &[u8]) -> CommentId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    CommentId::from_uuid(uuid::Uuid::from_bytes(bytes))
}

/// Create a like key.
///
/// Format: `user_id (16 bytes) || target_tag (1 byte) || target_id (16 bytes)`
///
/// The key is the uniqueness constraint: at most one like per
/// `(user, target type, target id)` tuple.
#[must_use]
pub fn like_key(user_id: &UserId, target: LikeTarget) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.extend_from_slice(user_id.as_bytes());
    key.push(target.tag());
    key.extend_from_slice(&target.id_bytes());
    key
}

/// Create a relation key.
///
/// Format: `from_user (16 bytes) || to_user (16 bytes) || kind_tag (1 byte)`
#[must_use]
pub fn relation_key(from_user: &UserId, to_user: &UserId, kind: RelationKind) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.extend_from_slice(from_user.as_bytes());
    key.extend_from_slice(to_user.as_bytes());
    key.push(kind.tag());
    key
}

/// Create a relation-by-target index key.
///
/// Format: `to_user (16 bytes) || from_user (16 bytes) || kind_tag (1 byte)`
#[must_use]
pub fn relation_target_key(from_user: &UserId, to_user: &UserId, kind: RelationKind) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.extend_from_slice(to_user.as_bytes());
    key.extend_from_slice(from_user.as_bytes());
    key.push(kind.tag());
    key
}

/// Create a prefix for iterating all relations originating from a user.
#[must_use]
pub fn relations_from_prefix(from_user: &UserId) -> Vec<u8> {
    from_user.as_bytes().to_vec()
}

/// Create a prefix for iterating all relations targeting a user.
#[must_use]
pub fn relations_to_prefix(to_user: &UserId) -> Vec<u8> {
    to_user.as_bytes().to_vec()
}

/// Extract `(from_user, to_user, kind tag)` from a relation key.
///
/// # Panics
///
/// Panics if the key is not exactly 33 bytes.
#[must_use]
pub fn decode_relation_key(key: &[u8]) -> (UserId, UserId, u8) {
    let mut from = [0u8; 16];
    let mut to = [0u8; 16];
    from.copy_from_slice(&key[..16]);
    to.copy_from_slice(&key[16..32]);
    (
        UserId::from_uuid(uuid::Uuid::from_bytes(from)),
        UserId::from_uuid(uuid::Uuid::from_bytes(to)),
        key[32],
    )
}

/// Create an activity key.
///
/// Format: `user_id (16 bytes) || record_id (16 bytes, ULID)`
///
/// Since ULIDs are time-ordered, a user's activities iterate chronologically.
#[must_use]
pub fn activity_key(user_id: &UserId, record_id: &RecordId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&record_id.to_bytes());
    key
}

/// Create a prefix for iterating all activities of a user.
#[must_use]
pub fn user_activities_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a points account key from a user ID.
#[must_use]
pub fn points_account_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a points-history key.
///
/// Format: `user_id (16 bytes) || entry_id (16 bytes, ULID)`
#[must_use]
pub fn points_history_key(user_id: &UserId, entry_id: &EntryId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&entry_id.to_bytes());
    key
}

/// Create a prefix for iterating a user's points history.
#[must_use]
pub fn points_history_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a daily-task key.
///
/// Format: `user_id (16 bytes) || task_tag (1 byte) || day (4 bytes, big-endian)`
///
/// The key is the daily uniqueness constraint on `(user, task, calendar day)`.
#[must_use]
pub fn daily_task_key(user_id: &UserId, task_type: TaskType, day: NaiveDate) -> Vec<u8> {
    let mut key = Vec::with_capacity(21);
    key.extend_from_slice(user_id.as_bytes());
    key.push(task_type.tag());
    key.extend_from_slice(&day_key(day).to_be_bytes());
    key
}

/// Create a ranking key.
///
/// Format: `rank_type_tag (1 byte) || user_id (16 bytes)`
#[must_use]
pub fn ranking_key(rank_type: RankType, user_id: &UserId) -> Vec<u8> {
    let mut key = Vec::with_capacity(17);
    key.push(rank_type.tag());
    key.extend_from_slice(user_id.as_bytes());
    key
}

/// Create a prefix for iterating all ranking records of one dimension.
#[must_use]
pub fn rankings_prefix(rank_type: RankType) -> Vec<u8> {
    vec![rank_type.tag()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use swimclub_core::MomentId;

    #[test]
    fn like_key_layout() {
        let user_id = UserId::generate();
        let target = LikeTarget::Moment(MomentId::generate());
        let key = like_key(&user_id, target);

        assert_eq!(key.len(), 33);
        assert_eq!(&key[..16], user_id.as_bytes());
        assert_eq!(key[16], target.tag());
    }

    #[test]
    fn relation_key_layout() {
        let from = UserId::generate();
        let to = UserId::generate();
        let key = relation_key(&from, &to, RelationKind::Follow);

        assert_eq!(key.len(), 33);
        let (decoded_from, decoded_to, tag) = decode_relation_key(&key);
        assert_eq!(decoded_from, from);
        assert_eq!(decoded_to, to);
        assert_eq!(tag, RelationKind::Follow.tag());
    }

    #[test]
    fn relation_target_key_swaps_users() {
        let from = UserId::generate();
        let to = UserId::generate();
        let key = relation_target_key(&from, &to, RelationKind::Follow);

        assert_eq!(&key[..16], to.as_bytes());
        assert_eq!(&key[16..32], from.as_bytes());
    }

    #[test]
    fn daily_task_key_distinct_per_day() {
        let user_id = UserId::generate();
        let day1 = chrono::NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let day2 = chrono::NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();

        let k1 = daily_task_key(&user_id, TaskType::Swim500m, day1);
        let k2 = daily_task_key(&user_id, TaskType::Swim500m, day2);
        let k3 = daily_task_key(&user_id, TaskType::Swim1000m, day1);

        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
        assert!(k1 < k2); // big-endian day keeps chronological key order
    }

    #[test]
    fn moment_comment_key_roundtrip() {
        let moment_id = MomentId::generate();
        let comment_id = CommentId::generate();
        let key = moment_comment_key(&moment_id, &comment_id);

        assert_eq!(extract_comment_id_from_moment_key(&key), comment_id);
    }

    #[test]
    fn ranking_key_prefix_is_dimension() {
        let user_id = UserId::generate();
        let key = ranking_key(RankType::Total, &user_id);
        assert!(key.starts_with(&rankings_prefix(RankType::Total)));
        assert!(!key.starts_with(&rankings_prefix(RankType::Daily)));
    }
}
