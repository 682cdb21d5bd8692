//! Subscription rows linking users to plans.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use fuze_core::types::{DbId, Timestamp};

/// Subscription lifecycle status (TEXT column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    PastDue,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Cancelled => "CANCELLED",
            SubscriptionStatus::PastDue => "PAST_DUE",
        }
    }
}

/// A row from the `subscriptions` table.
///
/// The intended invariant (not database-enforced) is at most one row per
/// user with `status = 'ACTIVE'` and `current_end IS NULL`; the resolver
/// breaks ties by most recent `current_start`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: DbId,
    pub status: String,
    pub current_start: Timestamp,
    pub current_end: Option<Timestamp>,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_match_schema_check() {
        assert_eq!(SubscriptionStatus::Active.as_str(), "ACTIVE");
        assert_eq!(SubscriptionStatus::Cancelled.as_str(), "CANCELLED");
        assert_eq!(SubscriptionStatus::PastDue.as_str(), "PAST_DUE");
    }
}
