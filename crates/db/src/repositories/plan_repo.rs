//! Repository for the `plans` and `plan_entitlements` tables.

use sqlx::PgPool;

use fuze_core::types::DbId;

use crate::models::plan::{Plan, PlanEntitlementRow};

/// Column list for `plans` queries.
const PLAN_COLUMNS: &str = "id, code, name, priority, created_at";

/// Column list for `plan_entitlements` queries.
const ENTITLEMENT_COLUMNS: &str = "id, plan_id, version, entitlements, created_at";

/// Read access to plans and their versioned entitlements.
pub struct PlanRepo;

impl PlanRepo {
    /// Find a plan by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1");
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The current entitlement for a plan: the row with the highest version.
    /// Returns `None` when the plan has zero entitlement versions.
    pub async fn latest_entitlement(
        pool: &PgPool,
        plan_id: DbId,
    ) -> Result<Option<PlanEntitlementRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTITLEMENT_COLUMNS} FROM plan_entitlements \
             WHERE plan_id = $1 \
             ORDER BY version DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, PlanEntitlementRow>(&query)
            .bind(plan_id)
            .fetch_optional(pool)
            .await
    }
}
