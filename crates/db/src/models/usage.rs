//! Per-user, per-period usage counters.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use fuze_core::types::DbId;

/// A row from the `usage_counters` table.
///
/// `jobs_total` is the summed weight consumed inside
/// `[period_start, period_end)`. This row is the only shared mutable state
/// in the admission path; it is only ever written through the conditional
/// charge in `UsageRepo::try_charge`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsageCounter {
    pub id: DbId,
    pub user_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub jobs_total: i64,
}
