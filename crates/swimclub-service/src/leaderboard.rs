//! Leaderboard orchestration.
//!
//! Swim distance fans out to every ranking dimension, then each touched
//! dimension gets a full rank recompute so reads never see stale positions.
//! Daily distance milestones ride the same path: after the fan-out the
//! user's same-day total decides which swim tasks to award, and the daily
//! task ledger keeps the awards idempotent.

use chrono::{DateTime, Utc};

use swimclub_core::{local_day, RankType, Region, TaskType, UserId, DISTANCE_MILESTONES};
use swimclub_store::{RocksStore, Store, TaskOutcome};

use crate::error::ApiError;

/// Apply a swim distance to every ranking dimension and recompute ranks.
pub fn apply_swim_distance(
    store: &RocksStore,
    user_id: &UserId,
    distance: i64,
    region: Option<&Region>,
) -> Result<(), ApiError> {
    for rank_type in RankType::ALL {
        store.update_user_stats(user_id, rank_type, distance, true, region)?;
    }
    for rank_type in RankType::ALL {
        store.update_all_ranks(rank_type)?;
    }
    Ok(())
}

/// Apply a swim distance to one ranking dimension and recompute its ranks.
pub fn sync_dimension(
    store: &RocksStore,
    user_id: &UserId,
    rank_type: RankType,
    distance: i64,
    region: Option<&Region>,
) -> Result<(), ApiError> {
    store.update_user_stats(user_id, rank_type, distance, true, region)?;
    store.update_all_ranks(rank_type)?;
    Ok(())
}

/// Award any distance milestones the user's same-day total has crossed.
///
/// Returns the tasks completed by this call and the points they carried.
/// Milestones already completed today award nothing.
pub fn award_distance_milestones(
    store: &RocksStore,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> Result<(Vec<TaskType>, i64), ApiError> {
    let day_total = store.sum_distance_for_day(user_id, local_day(now))?;

    let mut completed = Vec::new();
    let mut points_awarded = 0;
    for (threshold, task_type) in DISTANCE_MILESTONES {
        if day_total < threshold {
            continue;
        }
        if let TaskOutcome::Awarded { points, .. } =
            store.complete_daily_task(user_id, task_type, now)?
        {
            tracing::info!(
                user_id = %user_id,
                task = %task_type.as_str(),
                points,
                "Distance milestone reached"
            );
            completed.push(task_type);
            points_awarded += points;
        }
    }
    Ok((completed, points_awarded))
}
