//! Plan and versioned entitlement rows.

use serde::Serialize;
use sqlx::FromRow;

use fuze_core::types::{DbId, Timestamp};

/// A row from the `plans` table. Plans are immutable identities; limits live
/// in versioned entitlement rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub priority: i32,
    pub created_at: Timestamp,
}

/// A row from the `plan_entitlements` table. Rows are append-only per plan;
/// the highest `version` is the current entitlement.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlanEntitlementRow {
    pub id: DbId,
    pub plan_id: DbId,
    pub version: i32,
    pub entitlements: serde_json::Value,
    pub created_at: Timestamp,
}
