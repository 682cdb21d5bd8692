//! Repository for the `subscriptions` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::subscription::{Subscription, SubscriptionStatus};

/// Column list for `subscriptions` queries.
const COLUMNS: &str = "id, user_id, plan_id, status, current_start, current_end, created_at";

/// Read access to subscription rows.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Find the user's current active subscription: `status = 'ACTIVE'`,
    /// `current_end IS NULL`, most recent `current_start` wins.
    pub async fn find_current_active(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions \
             WHERE user_id = $1 AND status = $2 AND current_end IS NULL \
             ORDER BY current_start DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .bind(SubscriptionStatus::Active.as_str())
            .fetch_optional(pool)
            .await
    }
}
