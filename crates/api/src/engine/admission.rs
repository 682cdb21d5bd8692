//! The admission controller.
//!
//! Runs the ordered, fail-fast validation chain for a job request: resolve
//! the active subscription and its current entitlement, resolve the
//! requested processors against the catalog, apply the plan gates, then
//! create the QUEUED job and charge the usage counter in one transaction
//! and hand the job to the dispatcher.
//!
//! Every rejection here happens before any row is written; the one failure
//! that can occur afterwards (queue publish) is compensated by the
//! dispatcher and the quota charge is intentionally not refunded.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use fuze_core::admission::{self, AdmissionError, MediaProbe, ProcessorWeight};
use fuze_core::entitlement::PlanEntitlements;
use fuze_core::error::CoreError;
use fuze_core::quota::daily_period;
use fuze_db::models::job::{Job, SubmitJob};
use fuze_db::models::media_asset::MediaAsset;
use fuze_db::repositories::{
    FeatureRepo, JobRepo, MediaAssetRepo, NewJob, PlanRepo, SubscriptionRepo, UsageRepo,
};

use crate::engine::dispatcher;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Admit a job request for `user_id`, returning the created QUEUED job.
pub async fn admit(state: &AppState, user_id: Uuid, input: &SubmitJob) -> AppResult<Job> {
    if input.processors.is_empty() {
        return Err(AppError::BadRequest(
            "at least one processor is required".into(),
        ));
    }

    // 1. Resolve the active subscription and its current entitlement.
    let subscription = SubscriptionRepo::find_current_active(&state.pool, user_id)
        .await?
        .ok_or(AdmissionError::NoActiveSubscription)?;

    let entitlement_row = PlanRepo::latest_entitlement(&state.pool, subscription.plan_id)
        .await?
        .ok_or(AdmissionError::NoEntitlement)?;

    let entitlements = PlanEntitlements::from_blob(&entitlement_row.entitlements)?;

    // 2. Resolve processors against the catalog. A name that is absent or
    //    inactive is an explicit rejection, never a zero-weight pass.
    let processors = resolve_processors(state, &input.processors).await?;

    // 3-6. Plan gates: processor count, per-job weight, daily quota
    //       (fail-fast precheck), source-media ceilings.
    let (period_start, period_end) = daily_period(Utc::now());
    let used = UsageRepo::current_total(&state.pool, user_id, period_start, period_end).await?;

    let source = require_asset(state, input.source_asset_id).await?;
    require_asset(state, input.target_asset_id).await?;
    if let Some(audio_id) = input.audio_asset_id {
        require_asset(state, audio_id).await?;
    }

    let probe = MediaProbe {
        duration_sec: source.duration_sec,
        width: source.width,
        height: source.height,
    };

    let weight = admission::evaluate(&entitlements, &processors, used, Some(&probe))?;

    // 7. Atomically create the QUEUED job and charge the counter. The
    //    conditional charge re-asserts the quota under the transaction, so
    //    two racing admissions near the boundary cannot both pass.
    let new_job = NewJob {
        user_id,
        source_asset_id: input.source_asset_id,
        target_asset_id: input.target_asset_id,
        audio_asset_id: input.audio_asset_id,
        processors: input.processors.clone(),
        options: input
            .options
            .clone()
            .unwrap_or_else(|| serde_json::json!({})),
        weight,
    };

    let job = JobRepo::create_admitted(
        &state.pool,
        &new_job,
        period_start,
        period_end,
        entitlements.daily_weight_quota,
    )
    .await?
    .ok_or(AdmissionError::QuotaExceeded {
        used,
        requested: weight,
        quota: entitlements.daily_weight_quota,
    })?;

    tracing::info!(
        job_id = %job.id,
        user_id = %user_id,
        weight,
        plan_id = subscription.plan_id,
        "Job admitted",
    );

    // 8. Publish to the worker queue. On failure the job is compensated to
    //    FAILED and the error propagates to the caller.
    dispatcher::publish_or_compensate(state, &job).await?;

    Ok(job)
}

/// Map requested processor names to catalog weights, rejecting the first
/// name with no ACTIVE `type = 'processor'` catalog entry.
async fn resolve_processors(
    state: &AppState,
    requested: &[String],
) -> AppResult<Vec<ProcessorWeight>> {
    let features = FeatureRepo::find_active_processors_by_names(&state.pool, requested).await?;
    let catalog: HashMap<&str, i64> = features
        .iter()
        .map(|f| (f.name.as_str(), f.weight))
        .collect();

    let mut resolved = Vec::with_capacity(requested.len());
    for name in requested {
        let Some(&weight) = catalog.get(name.as_str()) else {
            return Err(AdmissionError::UnknownProcessor(name.clone()).into());
        };
        resolved.push(ProcessorWeight {
            name: name.clone(),
            weight,
        });
    }
    Ok(resolved)
}

/// Fetch a referenced media asset or fail the request with 404.
async fn require_asset(state: &AppState, id: Uuid) -> AppResult<MediaAsset> {
    MediaAssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "MediaAsset",
                id,
            })
        })
}
