//! Repository for the `usage_counters` table.
//!
//! The usage row is the shared mutable state of the admission path. The
//! check-then-act sequence (read usage, compare to quota, write) must never
//! be split across separable statements; [`UsageRepo::try_charge`] folds the
//! comparison and the increment into one conditional UPDATE so two racing
//! admissions near the boundary cannot jointly overshoot the quota.

use chrono::NaiveDate;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Access to per-period usage counters.
pub struct UsageRepo;

impl UsageRepo {
    /// Lazily create the counter row for a period (no-op when it exists).
    ///
    /// Takes an executor so callers can run it inside the admission
    /// transaction.
    pub async fn ensure_counter(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO usage_counters (user_id, period_start, period_end, jobs_total) \
             VALUES ($1, $2, $3, 0) \
             ON CONFLICT (user_id, period_start, period_end) DO NOTHING",
        )
        .bind(user_id)
        .bind(period_start)
        .bind(period_end)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// The weight consumed in a period; 0 when no counter row exists yet.
    pub async fn current_total(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT jobs_total FROM usage_counters \
             WHERE user_id = $1 AND period_start = $2 AND period_end = $3",
        )
        .bind(user_id)
        .bind(period_start)
        .bind(period_end)
        .fetch_optional(executor)
        .await?;
        Ok(total.unwrap_or(0))
    }

    /// Atomically charge `weight` against the counter iff the result stays
    /// within `quota`. Returns `false` (and writes nothing) when the charge
    /// would overshoot.
    pub async fn try_charge(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
        weight: i64,
        quota: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE usage_counters \
             SET jobs_total = jobs_total + $4 \
             WHERE user_id = $1 AND period_start = $2 AND period_end = $3 \
               AND jobs_total + $4 <= $5",
        )
        .bind(user_id)
        .bind(period_start)
        .bind(period_end)
        .bind(weight)
        .bind(quota)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
