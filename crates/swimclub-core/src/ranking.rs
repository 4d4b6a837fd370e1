//! Leaderboard types for swimclub.
//!
//! A [`RankingRecord`] accumulates a user's totals for one leaderboard
//! dimension. The cached `rank` field is a projection assigned by the
//! recompute pass and goes stale as soon as further stats land; the next
//! recompute converges it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UserId;

/// A leaderboard dimension.
///
/// All five dimensions currently share the same accumulate-forever update
/// path: nothing resets daily/weekly/monthly/yearly totals at period
/// boundaries, so only the label differs. Period windowing is a known gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankType {
    /// Daily leaderboard.
    Daily,
    /// Weekly leaderboard.
    Weekly,
    /// Monthly leaderboard.
    Monthly,
    /// Yearly leaderboard.
    Yearly,
    /// All-time leaderboard.
    Total,
}

impl RankType {
    /// All leaderboard dimensions, in storage-tag order.
    pub const ALL: [Self; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
        Self::Total,
    ];

    /// Stable single-byte tag used as a storage key prefix.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Daily => 0,
            Self::Weekly => 1,
            Self::Monthly => 2,
            Self::Yearly => 3,
            Self::Total => 4,
        }
    }

    /// Wire name of the dimension (matches the query-string `type` values).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Total => "total",
        }
    }
}

impl fmt::Display for RankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankType {
    type Err = ParseRankTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "total" => Ok(Self::Total),
            _ => Err(ParseRankTypeError(s.to_string())),
        }
    }
}

/// Error returned when a rank type string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rank type: {0}")]
pub struct ParseRankTypeError(pub String);

/// Administrative region attached to users and ranking records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Province name.
    pub province: String,

    /// City name, usually carrying a trailing "市" suffix.
    pub city: String,

    /// Canonical administrative city code, when known.
    pub city_code: Option<String>,
}

impl Region {
    /// Check whether this region matches a regional-rankings query.
    ///
    /// An exact `city_code` match wins when the caller supplies one and this
    /// region carries one. Otherwise the city strings are compared modulo a
    /// trailing "市" suffix, so a query for `"北京"` matches a stored
    /// `"北京市"` and vice versa. The string fallback is brittle but kept for
    /// compatibility with existing clients.
    #[must_use]
    pub fn matches(&self, city: &str, city_code: Option<&str>) -> bool {
        if let (Some(code), Some(own)) = (city_code, self.city_code.as_deref()) {
            return code == own;
        }
        normalize_city(&self.city) == normalize_city(city)
    }
}

/// Strip a trailing "市" (city) suffix for comparison.
fn normalize_city(city: &str) -> &str {
    city.strip_suffix('市').unwrap_or(city)
}

/// A user's accumulated statistics for one leaderboard dimension.
///
/// Uniqueness: one record per `(user_id, rank_type)`. Stats grow
/// monotonically through upsert-increments; `rank` is rewritten wholesale by
/// the recompute pass, with `0` meaning "never ranked yet".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRecord {
    /// The ranked user.
    pub user_id: UserId,

    /// The leaderboard dimension this record belongs to.
    pub rank_type: RankType,

    /// Accumulated distance in meters.
    pub total_distance: i64,

    /// Number of activities counted into this record.
    pub activity_count: i64,

    /// Cached rank position (1-based). `0` until the first recompute pass.
    pub rank: u32,

    /// Region captured when the record was first created.
    pub region: Region,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl RankingRecord {
    /// Create a fresh record with zeroed stats for a `(user, dimension)` pair.
    #[must_use]
    pub fn new(user_id: UserId, rank_type: RankType, region: Region) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            rank_type,
            total_distance: 0,
            activity_count: 0,
            rank: 0,
            region,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a recompute pass has assigned this record a position yet.
    #[must_use]
    pub const fn is_ranked(&self) -> bool {
        self.rank > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_type_roundtrip() {
        for rt in RankType::ALL {
            assert_eq!(rt.as_str().parse::<RankType>().unwrap(), rt);
        }
    }

    #[test]
    fn rank_type_tags_are_distinct() {
        let mut tags: Vec<u8> = RankType::ALL.iter().map(|rt| rt.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), RankType::ALL.len());
    }

    #[test]
    fn unknown_rank_type_rejected() {
        assert!("hourly".parse::<RankType>().is_err());
    }

    #[test]
    fn city_suffix_normalization() {
        let region = Region {
            province: "北京".into(),
            city: "北京市".into(),
            city_code: None,
        };
        assert!(region.matches("北京", None));
        assert!(region.matches("北京市", None));
        assert!(!region.matches("上海", None));
    }

    #[test]
    fn city_code_match_preferred() {
        let region = Region {
            province: "广东省".into(),
            city: "深圳市".into(),
            city_code: Some("440300".into()),
        };
        assert!(region.matches("whatever", Some("440300")));
        assert!(!region.matches("深圳", Some("440100")));
        // No code supplied: fall back to the string comparison.
        assert!(region.matches("深圳", None));
    }

    #[test]
    fn new_record_is_unranked() {
        let record = RankingRecord::new(UserId::generate(), RankType::Total, Region::default());
        assert_eq!(record.total_distance, 0);
        assert_eq!(record.activity_count, 0);
        assert!(!record.is_ranked());
    }
}
