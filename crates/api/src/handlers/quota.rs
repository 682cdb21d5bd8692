//! Quota summary handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use fuze_core::admission::AdmissionError;
use fuze_core::entitlement::PlanEntitlements;
use fuze_core::error::CoreError;
use fuze_core::quota::daily_period;
use fuze_db::repositories::{PlanRepo, SubscriptionRepo, UsageRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Current-period quota standing for the caller.
#[derive(Debug, Serialize)]
pub struct QuotaSummary {
    pub plan_code: String,
    pub plan_name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
}

/// GET /api/v1/quota
///
/// The caller's plan, the current daily period, and how much weight is
/// used / remaining. Resolves the subscription the same way admission does,
/// so the numbers here are the numbers admission will apply.
pub async fn quota_summary(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let subscription = SubscriptionRepo::find_current_active(&state.pool, auth.user_id)
        .await?
        .ok_or(AdmissionError::NoActiveSubscription)?;

    let plan = PlanRepo::find_by_id(&state.pool, subscription.plan_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Internal(format!(
                "subscription {} references missing plan {}",
                subscription.id, subscription.plan_id
            )))
        })?;

    let entitlement_row = PlanRepo::latest_entitlement(&state.pool, subscription.plan_id)
        .await?
        .ok_or(AdmissionError::NoEntitlement)?;
    let entitlements = PlanEntitlements::from_blob(&entitlement_row.entitlements)?;

    let (period_start, period_end) = daily_period(Utc::now());
    let used =
        UsageRepo::current_total(&state.pool, auth.user_id, period_start, period_end).await?;

    let limit = entitlements.daily_weight_quota;
    let summary = QuotaSummary {
        plan_code: plan.code,
        plan_name: plan.name,
        period_start,
        period_end,
        used,
        limit,
        remaining: (limit - used).max(0),
    };

    Ok(Json(DataResponse { data: summary }))
}
