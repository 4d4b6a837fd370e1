//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store`
//! trait. Mutating operations serialize on an internal mutex and apply
//! their writes through a single `WriteBatch`, which is what makes the
//! compound operations (like + counter, follow + two counters, task +
//! ledger + account) atomic with respect to each other.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode, Options,
    WriteBatch,
};

use swimclub_core::{
    local_day, ActivityRecord, Comment, CommentId, CounterField, DailyTaskRecord, EntryId,
    LikeRecord, LikeTarget, Moment, MomentId, PointsAccount, PointsHistoryEntry, RankType,
    RankingRecord, Region, Relation, RelationKind, TaskStatus, TaskType, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{CounterEntity, LikeOutcome, Store, TaskOutcome};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<rocksdb::MultiThreaded>>,
    /// Serializes mutating operations so check-then-write compounds behave
    /// like single atomic storage operations.
    mutations: Mutex<()>,
    /// Monotonic ULID source for points-history ids. A plain `Ulid::new()`
    /// is randomly ordered within one millisecond, which would make
    /// newest-first ledger reads nondeterministic for back-to-back awards.
    entry_ids: Mutex<ulid::Generator>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        tracing::debug!(
            column_families = all_column_families().len(),
            "Opened RocksDB database"
        );

        Ok(Self {
            db: Arc::new(db),
            mutations: Mutex::new(()),
            entry_ids: Mutex::new(ulid::Generator::new()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Acquire the mutation lock, recovering from poisoning.
    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.mutations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Read a typed value from a column family.
    fn get_value<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Whether a key exists in a column family.
    fn key_exists(&self, cf_name: &str, key: &[u8]) -> Result<bool> {
        let cf = self.cf(cf_name)?;
        Ok(self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some())
    }

    /// Collect all `(key, value)` pairs under a key prefix.
    fn scan_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let cf = self.cf(cf_name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));

        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }

    /// Next time-ordered points-history id. Ids from one store instance are
    /// strictly increasing even within a millisecond, so composite history
    /// keys iterate in insertion order.
    fn next_entry_id(&self) -> Result<EntryId> {
        let mut generator = self
            .entry_ids
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let ulid = generator
            .generate()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(EntryId::from_ulid(ulid))
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// All ranking records of one dimension, in key (user-id) order.
    fn rankings_for(&self, rank_type: RankType) -> Result<Vec<RankingRecord>> {
        let prefix = keys::rankings_prefix(rank_type);
        self.scan_prefix(cf::RANKINGS, &prefix)?
            .into_iter()
            .map(|(_, value)| Self::deserialize(&value))
            .collect()
    }

    /// Read a user or fail with `NotFound`.
    fn require_user(&self, user_id: &UserId) -> Result<User> {
        self.get_user(user_id)?.ok_or_else(|| StoreError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        })
    }

    /// Read the relation row for a `(from, to, kind)` tuple.
    fn get_relation(
        &self,
        from_user: &UserId,
        to_user: &UserId,
        kind: RelationKind,
    ) -> Result<Option<Relation>> {
        self.get_value(
            cf::RELATIONS,
            &keys::relation_key(from_user, to_user, kind),
        )
    }

    /// Upsert a relation of the given kind to the desired active state,
    /// without touching counters. Returns `true` when the state flipped.
    ///
    /// Caller must hold the mutation lock.
    fn set_relation_state(
        &self,
        from_user: &UserId,
        to_user: &UserId,
        kind: RelationKind,
        active: bool,
    ) -> Result<bool> {
        let existing = self.get_relation(from_user, to_user, kind)?;
        let already = existing.as_ref().is_some_and(Relation::is_active);
        if already == active {
            // Covers tombstoning something that never existed.
            return Ok(false);
        }

        let now = Utc::now();
        let relation = match existing {
            Some(mut r) => {
                r.tombstoned = !active;
                r.updated_at = now;
                r
            }
            None => {
                let mut r = Relation::new(*from_user, *to_user, kind);
                r.tombstoned = !active;
                r
            }
        };

        let cf_relations = self.cf(cf::RELATIONS)?;
        let cf_by_target = self.cf(cf::RELATIONS_BY_TARGET)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_relations,
            keys::relation_key(from_user, to_user, kind),
            Self::serialize(&relation)?,
        );
        batch.put_cf(
            &cf_by_target,
            keys::relation_target_key(from_user, to_user, kind),
            [],
        );
        self.write_batch(batch)?;
        Ok(true)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn put_user(&self, user: &User) -> Result<()> {
        let _guard = self.write_guard();
        let cf_users = self.cf(cf::USERS)?;
        let cf_index = self.cf(cf::USERS_BY_OPEN_ID)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_users, keys::user_key(&user.id), Self::serialize(user)?);
        batch.put_cf(
            &cf_index,
            keys::open_id_key(&user.open_id),
            user.id.as_bytes(),
        );
        self.write_batch(batch)
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        self.get_value(cf::USERS, &keys::user_key(user_id))
    }

    fn find_user_by_open_id(&self, open_id: &str) -> Result<Option<User>> {
        let cf_index = self.cf(cf::USERS_BY_OPEN_ID)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf_index, keys::open_id_key(open_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let uuid = uuid::Uuid::from_slice(&id_bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.get_user(&UserId::from_uuid(uuid))
    }

    fn update_follow_counters(
        &self,
        user_id: &UserId,
        followers_delta: i64,
        following_delta: i64,
    ) -> Result<User> {
        let _guard = self.write_guard();
        let mut user = self.require_user(user_id)?;

        user.followers = (user.followers + followers_delta).max(0);
        user.following = (user.following + following_delta).max(0);
        user.updated_at = Utc::now();

        let cf_users = self.cf(cf::USERS)?;
        self.db
            .put_cf(&cf_users, keys::user_key(user_id), Self::serialize(&user)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(user)
    }

    // =========================================================================
    // Moment Operations
    // =========================================================================

    fn put_moment(&self, moment: &Moment) -> Result<()> {
        let _guard = self.write_guard();
        let cf_moments = self.cf(cf::MOMENTS)?;
        self.db
            .put_cf(
                &cf_moments,
                keys::moment_key(&moment.id),
                Self::serialize(moment)?,
            )
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_moment(&self, moment_id: &MomentId) -> Result<Option<Moment>> {
        self.get_value(cf::MOMENTS, &keys::moment_key(moment_id))
    }

    fn list_moments(&self, limit: usize, offset: usize) -> Result<Vec<Moment>> {
        let mut moments: Vec<Moment> = self
            .scan_prefix(cf::MOMENTS, &[])?
            .into_iter()
            .map(|(_, value)| Self::deserialize::<Moment>(&value))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .filter(|m| !m.is_deleted)
            .collect();

        moments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(moments.into_iter().skip(offset).take(limit).collect())
    }

    fn soft_delete_moment(&self, moment_id: &MomentId) -> Result<()> {
        let _guard = self.write_guard();
        let mut moment = self
            .get_moment(moment_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "moment",
                id: moment_id.to_string(),
            })?;

        moment.is_deleted = true;
        moment.updated_at = Utc::now();

        let cf_moments = self.cf(cf::MOMENTS)?;
        self.db
            .put_cf(
                &cf_moments,
                keys::moment_key(moment_id),
                Self::serialize(&moment)?,
            )
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    // =========================================================================
    // Comment Operations
    // =========================================================================

    fn create_comment(&self, comment: &Comment) -> Result<Moment> {
        let _guard = self.write_guard();
        let mut moment = self
            .get_moment(&comment.moment_id)?
            .filter(|m| !m.is_deleted)
            .ok_or_else(|| StoreError::NotFound {
                entity: "moment",
                id: comment.moment_id.to_string(),
            })?;

        moment.comment_count += 1;
        moment.updated_at = Utc::now();

        let cf_comments = self.cf(cf::COMMENTS)?;
        let cf_index = self.cf(cf::COMMENTS_BY_MOMENT)?;
        let cf_moments = self.cf(cf::MOMENTS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_comments,
            keys::comment_key(&comment.id),
            Self::serialize(comment)?,
        );
        batch.put_cf(
            &cf_index,
            keys::moment_comment_key(&comment.moment_id, &comment.id),
            [],
        );
        batch.put_cf(
            &cf_moments,
            keys::moment_key(&comment.moment_id),
            Self::serialize(&moment)?,
        );
        self.write_batch(batch)?;
        Ok(moment)
    }

    fn get_comment(&self, comment_id: &CommentId) -> Result<Option<Comment>> {
        self.get_value(cf::COMMENTS, &keys::comment_key(comment_id))
    }

    fn list_comments(
        &self,
        moment_id: &MomentId,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Comment>, usize)> {
        let prefix = keys::moment_comments_prefix(moment_id);
        let mut comments = Vec::new();

        for (key, _) in self.scan_prefix(cf::COMMENTS_BY_MOMENT, &prefix)? {
            let comment_id = keys::extract_comment_id_from_moment_key(&key);
            if let Some(comment) = self.get_comment(&comment_id)? {
                if !comment.is_deleted {
                    comments.push(comment);
                }
            }
        }

        let total = comments.len();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok((
            comments.into_iter().skip(offset).take(limit).collect(),
            total,
        ))
    }

    fn soft_delete_comment(&self, comment_id: &CommentId) -> Result<()> {
        let _guard = self.write_guard();
        let mut comment = self
            .get_comment(comment_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "comment",
                id: comment_id.to_string(),
            })?;

        if comment.is_deleted {
            return Ok(());
        }
        comment.is_deleted = true;

        let cf_comments = self.cf(cf::COMMENTS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_comments,
            keys::comment_key(comment_id),
            Self::serialize(&comment)?,
        );

        // The parent counter drops in the same batch.
        if let Some(mut moment) = self.get_moment(&comment.moment_id)? {
            moment.comment_count = (moment.comment_count - 1).max(0);
            moment.updated_at = Utc::now();
            let cf_moments = self.cf(cf::MOMENTS)?;
            batch.put_cf(
                &cf_moments,
                keys::moment_key(&comment.moment_id),
                Self::serialize(&moment)?,
            );
        }

        self.write_batch(batch)
    }

    // =========================================================================
    // Counter Ledger
    // =========================================================================

    fn adjust_counter(
        &self,
        target: LikeTarget,
        field: CounterField,
        delta: i64,
    ) -> Result<CounterEntity> {
        let _guard = self.write_guard();
        match target {
            LikeTarget::Moment(id) => {
                let mut moment = self.get_moment(&id)?.ok_or_else(|| StoreError::NotFound {
                    entity: "moment",
                    id: id.to_string(),
                })?;

                match field {
                    CounterField::Likes => {
                        moment.like_count = (moment.like_count + delta).max(0);
                    }
                    CounterField::Comments => {
                        moment.comment_count = (moment.comment_count + delta).max(0);
                    }
                }
                moment.updated_at = Utc::now();

                let cf_moments = self.cf(cf::MOMENTS)?;
                self.db
                    .put_cf(&cf_moments, keys::moment_key(&id), Self::serialize(&moment)?)
                    .map_err(|e| StoreError::Database(e.to_string()))?;
                Ok(CounterEntity::Moment(moment))
            }
            LikeTarget::Comment(id) => {
                let mut comment = self.get_comment(&id)?.ok_or_else(|| StoreError::NotFound {
                    entity: "comment",
                    id: id.to_string(),
                })?;

                match field {
                    CounterField::Likes => {
                        comment.like_count = (comment.like_count + delta).max(0);
                    }
                    CounterField::Comments => {
                        return Err(StoreError::MissingCounter {
                            entity: "comment",
                            field: "comments",
                        });
                    }
                }

                let cf_comments = self.cf(cf::COMMENTS)?;
                self.db
                    .put_cf(
                        &cf_comments,
                        keys::comment_key(&id),
                        Self::serialize(&comment)?,
                    )
                    .map_err(|e| StoreError::Database(e.to_string()))?;
                Ok(CounterEntity::Comment(comment))
            }
        }
    }

    // =========================================================================
    // Like Operations
    // =========================================================================

    fn toggle_like(&self, user_id: &UserId, target: LikeTarget) -> Result<LikeOutcome> {
        let _guard = self.write_guard();
        let cf_likes = self.cf(cf::LIKES)?;
        let like_key = keys::like_key(user_id, target);

        let already_liked = self
            .db
            .get_cf(&cf_likes, &like_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        let delta: i64 = if already_liked { -1 } else { 1 };

        let mut batch = WriteBatch::default();

        // Counter and like row move in one batch.
        let like_count = match target {
            LikeTarget::Moment(id) => {
                let mut moment = self
                    .get_moment(&id)?
                    .filter(|m| !m.is_deleted)
                    .ok_or_else(|| StoreError::NotFound {
                        entity: "moment",
                        id: id.to_string(),
                    })?;
                moment.like_count = (moment.like_count + delta).max(0);
                moment.updated_at = Utc::now();

                let cf_moments = self.cf(cf::MOMENTS)?;
                batch.put_cf(&cf_moments, keys::moment_key(&id), Self::serialize(&moment)?);
                moment.like_count
            }
            LikeTarget::Comment(id) => {
                let mut comment = self
                    .get_comment(&id)?
                    .filter(|c| !c.is_deleted)
                    .ok_or_else(|| StoreError::NotFound {
                        entity: "comment",
                        id: id.to_string(),
                    })?;
                comment.like_count = (comment.like_count + delta).max(0);

                let cf_comments = self.cf(cf::COMMENTS)?;
                batch.put_cf(
                    &cf_comments,
                    keys::comment_key(&id),
                    Self::serialize(&comment)?,
                );
                comment.like_count
            }
        };

        if already_liked {
            batch.delete_cf(&cf_likes, &like_key);
        } else {
            let record = LikeRecord::new(*user_id, target);
            batch.put_cf(&cf_likes, &like_key, Self::serialize(&record)?);
        }

        self.write_batch(batch)?;
        Ok(LikeOutcome {
            liked: !already_liked,
            like_count,
        })
    }

    fn has_liked(&self, user_id: &UserId, target: LikeTarget) -> Result<bool> {
        self.key_exists(cf::LIKES, &keys::like_key(user_id, target))
    }

    // =========================================================================
    // Relation Operations
    // =========================================================================

    fn follow(&self, from_user: &UserId, to_user: &UserId) -> Result<bool> {
        let _guard = self.write_guard();
        let existing = self.get_relation(from_user, to_user, RelationKind::Follow)?;
        if existing.as_ref().is_some_and(Relation::is_active) {
            return Ok(false); // idempotent re-follow
        }

        let mut actor = self.require_user(from_user)?;
        let mut target = self.require_user(to_user)?;

        let now = Utc::now();
        let relation = match existing {
            Some(mut r) => {
                r.tombstoned = false;
                r.updated_at = now;
                r
            }
            None => Relation::new(*from_user, *to_user, RelationKind::Follow),
        };

        actor.following += 1;
        actor.updated_at = now;
        target.followers += 1;
        target.updated_at = now;

        let cf_relations = self.cf(cf::RELATIONS)?;
        let cf_by_target = self.cf(cf::RELATIONS_BY_TARGET)?;
        let cf_users = self.cf(cf::USERS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_relations,
            keys::relation_key(from_user, to_user, RelationKind::Follow),
            Self::serialize(&relation)?,
        );
        batch.put_cf(
            &cf_by_target,
            keys::relation_target_key(from_user, to_user, RelationKind::Follow),
            [],
        );
        batch.put_cf(&cf_users, keys::user_key(from_user), Self::serialize(&actor)?);
        batch.put_cf(&cf_users, keys::user_key(to_user), Self::serialize(&target)?);
        self.write_batch(batch)?;
        Ok(true)
    }

    fn unfollow(&self, from_user: &UserId, to_user: &UserId) -> Result<bool> {
        let _guard = self.write_guard();
        let Some(mut relation) = self.get_relation(from_user, to_user, RelationKind::Follow)?
        else {
            return Ok(false);
        };
        if relation.tombstoned {
            return Ok(false);
        }

        let mut actor = self.require_user(from_user)?;
        let mut target = self.require_user(to_user)?;

        let now = Utc::now();
        relation.tombstoned = true;
        relation.updated_at = now;

        actor.following = (actor.following - 1).max(0);
        actor.updated_at = now;
        target.followers = (target.followers - 1).max(0);
        target.updated_at = now;

        let cf_relations = self.cf(cf::RELATIONS)?;
        let cf_users = self.cf(cf::USERS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_relations,
            keys::relation_key(from_user, to_user, RelationKind::Follow),
            Self::serialize(&relation)?,
        );
        batch.put_cf(&cf_users, keys::user_key(from_user), Self::serialize(&actor)?);
        batch.put_cf(&cf_users, keys::user_key(to_user), Self::serialize(&target)?);
        self.write_batch(batch)?;
        Ok(true)
    }

    fn block(&self, from_user: &UserId, to_user: &UserId) -> Result<bool> {
        let _guard = self.write_guard();
        self.set_relation_state(from_user, to_user, RelationKind::Block, true)
    }

    fn unblock(&self, from_user: &UserId, to_user: &UserId) -> Result<bool> {
        let _guard = self.write_guard();
        self.set_relation_state(from_user, to_user, RelationKind::Block, false)
    }

    fn is_following(&self, from_user: &UserId, to_user: &UserId) -> Result<bool> {
        Ok(self
            .get_relation(from_user, to_user, RelationKind::Follow)?
            .as_ref()
            .is_some_and(Relation::is_active))
    }

    fn is_blocked(&self, from_user: &UserId, to_user: &UserId) -> Result<bool> {
        Ok(self
            .get_relation(from_user, to_user, RelationKind::Block)?
            .as_ref()
            .is_some_and(Relation::is_active))
    }

    fn list_followers(&self, user_id: &UserId) -> Result<Vec<UserId>> {
        let prefix = keys::relations_to_prefix(user_id);
        let mut followers = Vec::new();

        for (key, _) in self.scan_prefix(cf::RELATIONS_BY_TARGET, &prefix)? {
            // Target index keys are `to || from || kind`.
            let (_, from_user, kind_tag) = keys::decode_relation_key(&key);
            if kind_tag != RelationKind::Follow.tag() {
                continue;
            }
            if self.is_following(&from_user, user_id)? {
                followers.push(from_user);
            }
        }
        Ok(followers)
    }

    fn list_following(&self, user_id: &UserId) -> Result<Vec<UserId>> {
        let prefix = keys::relations_from_prefix(user_id);
        let mut following = Vec::new();

        for (key, value) in self.scan_prefix(cf::RELATIONS, &prefix)? {
            let (_, to_user, kind_tag) = keys::decode_relation_key(&key);
            if kind_tag != RelationKind::Follow.tag() {
                continue;
            }
            let relation: Relation = Self::deserialize(&value)?;
            if relation.is_active() {
                following.push(to_user);
            }
        }
        Ok(following)
    }

    fn list_blocked(&self, user_id: &UserId) -> Result<Vec<UserId>> {
        let prefix = keys::relations_from_prefix(user_id);
        let mut blocked = Vec::new();

        for (key, value) in self.scan_prefix(cf::RELATIONS, &prefix)? {
            let (_, to_user, kind_tag) = keys::decode_relation_key(&key);
            if kind_tag != RelationKind::Block.tag() {
                continue;
            }
            let relation: Relation = Self::deserialize(&value)?;
            if relation.is_active() {
                blocked.push(to_user);
            }
        }
        Ok(blocked)
    }

    // =========================================================================
    // Activity Operations
    // =========================================================================

    fn put_activity(&self, record: &ActivityRecord) -> Result<()> {
        let _guard = self.write_guard();
        let cf_activities = self.cf(cf::ACTIVITIES)?;
        self.db
            .put_cf(
                &cf_activities,
                keys::activity_key(&record.user_id, &record.id),
                Self::serialize(record)?,
            )
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn latest_activity(&self, user_id: &UserId) -> Result<Option<ActivityRecord>> {
        let prefix = keys::user_activities_prefix(user_id);
        // ULID key suffixes are time-ordered, so the last entry is newest.
        let entries = self.scan_prefix(cf::ACTIVITIES, &prefix)?;
        entries
            .last()
            .map(|(_, value)| Self::deserialize(value))
            .transpose()
    }

    fn sum_distance_for_day(&self, user_id: &UserId, day: NaiveDate) -> Result<i64> {
        let prefix = keys::user_activities_prefix(user_id);
        let mut total = 0;

        for (_, value) in self.scan_prefix(cf::ACTIVITIES, &prefix)? {
            let record: ActivityRecord = Self::deserialize(&value)?;
            if local_day(record.recorded_at) == day {
                total += record.distance_m;
            }
        }
        Ok(total)
    }

    fn list_activities_since(
        &self,
        user_id: &UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityRecord>> {
        let prefix = keys::user_activities_prefix(user_id);
        let mut records = Vec::new();

        for (_, value) in self.scan_prefix(cf::ACTIVITIES, &prefix)? {
            let record: ActivityRecord = Self::deserialize(&value)?;
            if since.map_or(true, |cutoff| record.recorded_at >= cutoff) {
                records.push(record);
            }
        }
        Ok(records)
    }

    // =========================================================================
    // Points Ledger & Daily Task Tracker
    // =========================================================================

    fn get_or_create_points_account(&self, user_id: &UserId) -> Result<PointsAccount> {
        let _guard = self.write_guard();
        let key = keys::points_account_key(user_id);
        if let Some(account) = self.get_value::<PointsAccount>(cf::POINTS_ACCOUNTS, &key)? {
            return Ok(account);
        }

        let account = PointsAccount::new(*user_id);
        let cf_accounts = self.cf(cf::POINTS_ACCOUNTS)?;
        self.db
            .put_cf(&cf_accounts, key, Self::serialize(&account)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(account)
    }

    fn complete_daily_task(
        &self,
        user_id: &UserId,
        task_type: TaskType,
        now: DateTime<Utc>,
    ) -> Result<TaskOutcome> {
        let _guard = self.write_guard();
        let day = local_day(now);
        let task_key = keys::daily_task_key(user_id, task_type, day);

        // The key is the daily uniqueness constraint; an existing row means
        // the award already happened and the call degrades to a no-op.
        if self.key_exists(cf::DAILY_TASKS, &task_key)? {
            return Ok(TaskOutcome::AlreadyCompleted);
        }

        let points = task_type.points();
        let mut account = self
            .get_value::<PointsAccount>(cf::POINTS_ACCOUNTS, &keys::points_account_key(user_id))?
            .unwrap_or_else(|| PointsAccount::new(*user_id));
        account.total_points += points;
        account.updated_at = now;

        let record = DailyTaskRecord {
            user_id: *user_id,
            task_type,
            completed_at: now,
            points,
        };
        let entry = PointsHistoryEntry {
            id: self.next_entry_id()?,
            user_id: *user_id,
            task_type,
            points,
            created_at: now,
        };

        let cf_tasks = self.cf(cf::DAILY_TASKS)?;
        let cf_history = self.cf(cf::POINTS_HISTORY)?;
        let cf_accounts = self.cf(cf::POINTS_ACCOUNTS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_tasks, &task_key, Self::serialize(&record)?);
        batch.put_cf(
            &cf_history,
            keys::points_history_key(user_id, &entry.id),
            Self::serialize(&entry)?,
        );
        batch.put_cf(
            &cf_accounts,
            keys::points_account_key(user_id),
            Self::serialize(&account)?,
        );

        // Mirror onto the profile's denormalized total when the profile exists.
        if let Some(mut user) = self.get_user(user_id)? {
            user.points += points;
            user.updated_at = now;
            let cf_users = self.cf(cf::USERS)?;
            batch.put_cf(&cf_users, keys::user_key(user_id), Self::serialize(&user)?);
        }

        self.write_batch(batch)?;
        Ok(TaskOutcome::Awarded {
            points,
            total_points: account.total_points,
        })
    }

    fn list_points_history(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PointsHistoryEntry>> {
        let prefix = keys::points_history_prefix(user_id);
        let mut entries: Vec<PointsHistoryEntry> = self
            .scan_prefix(cf::POINTS_HISTORY, &prefix)?
            .into_iter()
            .map(|(_, value)| Self::deserialize(&value))
            .collect::<Result<Vec<_>>>()?;

        // Entry ids are monotonic, so key order is award order; history
        // reads newest-first.
        entries.reverse();
        Ok(entries.into_iter().skip(offset).take(limit).collect())
    }

    fn daily_task_statuses(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<Vec<TaskStatus>> {
        let day = local_day(now);
        let mut statuses = Vec::with_capacity(TaskType::ALL.len());

        for task_type in TaskType::ALL {
            let completed =
                self.key_exists(cf::DAILY_TASKS, &keys::daily_task_key(user_id, task_type, day))?;
            statuses.push(TaskStatus {
                task_type,
                points: task_type.points(),
                description: task_type.description().to_string(),
                completed,
            });
        }
        Ok(statuses)
    }

    // =========================================================================
    // Leaderboard Operations
    // =========================================================================

    fn update_user_stats(
        &self,
        user_id: &UserId,
        rank_type: RankType,
        distance: i64,
        increment_activity_count: bool,
        region: Option<&Region>,
    ) -> Result<RankingRecord> {
        let _guard = self.write_guard();
        let key = keys::ranking_key(rank_type, user_id);

        let mut record = match self.get_value::<RankingRecord>(cf::RANKINGS, &key)? {
            Some(mut existing) => {
                if let Some(region) = region {
                    existing.region = region.clone();
                }
                existing
            }
            None => RankingRecord::new(*user_id, rank_type, region.cloned().unwrap_or_default()),
        };

        record.total_distance += distance;
        if increment_activity_count {
            record.activity_count += 1;
        }
        record.updated_at = Utc::now();

        let cf_rankings = self.cf(cf::RANKINGS)?;
        self.db
            .put_cf(&cf_rankings, key, Self::serialize(&record)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(record)
    }

    fn get_ranking(&self, user_id: &UserId, rank_type: RankType) -> Result<Option<RankingRecord>> {
        self.get_value(cf::RANKINGS, &keys::ranking_key(rank_type, user_id))
    }

    fn update_all_ranks(&self, rank_type: RankType) -> Result<()> {
        let _guard = self.write_guard();
        let mut records = self.rankings_for(rank_type)?;
        if records.is_empty() {
            return Ok(());
        }

        // Stable sort: equal distances keep scan (user-id) order.
        records.sort_by(|a, b| b.total_distance.cmp(&a.total_distance));

        let cf_rankings = self.cf(cf::RANKINGS)?;
        let mut batch = WriteBatch::default();
        for (position, record) in records.iter_mut().enumerate() {
            record.rank = u32::try_from(position + 1).unwrap_or(u32::MAX);
            batch.put_cf(
                &cf_rankings,
                keys::ranking_key(rank_type, &record.user_id),
                Self::serialize(record)?,
            );
        }
        self.write_batch(batch)
    }

    fn top_rankings(&self, rank_type: RankType, limit: usize) -> Result<Vec<RankingRecord>> {
        let mut records = self.rankings_for(rank_type)?;
        records.sort_by_key(|r| if r.rank == 0 { u32::MAX } else { r.rank });
        records.truncate(limit);
        Ok(records)
    }

    fn regional_rankings(
        &self,
        rank_type: RankType,
        city: &str,
        city_code: Option<&str>,
    ) -> Result<Vec<RankingRecord>> {
        let mut records: Vec<RankingRecord> = self
            .rankings_for(rank_type)?
            .into_iter()
            .filter(|r| r.region.matches(city, city_code))
            .collect();
        records.sort_by_key(|r| if r.rank == 0 { u32::MAX } else { r.rank });
        Ok(records)
    }
}
