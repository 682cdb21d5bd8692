//! Queue publish and worker-callback application.
//!
//! Publishing is synchronous within the admission (or requeue) request; a
//! publish failure compensates the job to FAILED with `DISPATCH_ERROR` and
//! the usage charge stands. Callback application routes an authenticated
//! worker callback to the matching state-machine transition and must stay
//! safe under queue redelivery and out-of-order arrival.

use serde::Deserialize;
use uuid::Uuid;

use fuze_core::error::CoreError;
use fuze_core::job_status::{
    JobStatus, TransitionError, ERROR_CODE_DISPATCH, ERROR_CODE_WORKER,
};
use fuze_db::models::job::Job;
use fuze_db::repositories::{JobRepo, TransitionOutcome};
use fuze_nsq::JobDescriptor;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Inbound worker callback body (camelCase on the wire, like the
/// descriptor).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerCallback {
    pub status: JobStatus,
    pub progress_pct: Option<i16>,
    pub output_key: Option<String>,
    pub error_message: Option<String>,
}

/// Publish a job descriptor to the worker queue; on failure, compensate the
/// job to FAILED (the quota charge is not refunded) and surface the error.
pub async fn publish_or_compensate(state: &AppState, job: &Job) -> AppResult<()> {
    let descriptor = JobDescriptor {
        job_id: job.id,
        user_id: job.user_id,
        source_asset_id: job.source_asset_id,
        target_asset_id: job.target_asset_id,
        audio_asset_id: job.audio_asset_id,
        processors: job.processors.clone(),
        options: job.options.clone(),
    };

    match state.queue.publish(&descriptor).await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!(
                job_id = %job.id,
                error = %err,
                "Queue publish failed; compensating job to FAILED",
            );
            let outcome = JobRepo::fail(
                &state.pool,
                job.id,
                &[JobStatus::Queued],
                ERROR_CODE_DISPATCH,
                &format!("dispatch failed: {err}"),
            )
            .await?;
            if let TransitionOutcome::Illegal { from } = outcome {
                // A callback won the race before compensation; leave it be.
                tracing::warn!(job_id = %job.id, %from, "Job moved on before dispatch compensation");
            }
            Err(AppError::Dispatch(err))
        }
    }
}

/// Apply an authenticated worker callback to the job state machine.
///
/// - `RUNNING` acknowledges a QUEUED job (sets `started_at`) and applies the
///   optional progress; on an already-RUNNING job it is a pure monotonic
///   progress update (stale/duplicate percentages are no-ops).
/// - `SUCCEEDED` requires `outputKey`; redelivery of the same
///   `(jobId, outputKey)` short-circuits without a second output asset.
/// - `FAILED` requires `errorMessage` and only applies from RUNNING.
/// - `QUEUED` (or any transition outside the table) is an invalid
///   transition; nothing is mutated.
pub async fn apply_callback(
    state: &AppState,
    job_id: Uuid,
    callback: &WorkerCallback,
) -> AppResult<Job> {
    if let Some(pct) = callback.progress_pct {
        if !(0..=100).contains(&pct) {
            return Err(AppError::BadRequest(format!(
                "progressPct must be within 0-100, got {pct}"
            )));
        }
    }

    match callback.status {
        JobStatus::Running => apply_running(state, job_id, callback.progress_pct).await,

        JobStatus::Succeeded => {
            let output_key = callback.output_key.as_deref().ok_or_else(|| {
                AppError::BadRequest("outputKey is required for a SUCCEEDED callback".into())
            })?;
            let outcome =
                JobRepo::complete(&state.pool, job_id, &state.config.output_bucket, output_key)
                    .await?;
            let job = settle(job_id, outcome, JobStatus::Succeeded)?;
            tracing::info!(job_id = %job.id, output_key, "Job succeeded");
            Ok(job)
        }

        JobStatus::Failed => {
            let error_message = callback.error_message.as_deref().ok_or_else(|| {
                AppError::BadRequest("errorMessage is required for a FAILED callback".into())
            })?;
            let outcome = JobRepo::fail(
                &state.pool,
                job_id,
                &[JobStatus::Running],
                ERROR_CODE_WORKER,
                error_message,
            )
            .await?;
            let job = settle(job_id, outcome, JobStatus::Failed)?;
            tracing::warn!(job_id = %job.id, error = error_message, "Job failed");
            Ok(job)
        }

        JobStatus::Queued => {
            // No callback reaches QUEUED; report it against the job's
            // actual state.
            let job = JobRepo::find_by_id(&state.pool, job_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Job",
                    id: job_id,
                }))?;
            let from = job.job_status().unwrap_or(JobStatus::Queued);
            Err(TransitionError {
                from,
                to: JobStatus::Queued,
            }
            .into())
        }
    }
}

/// A RUNNING callback: first acknowledgement moves QUEUED -> RUNNING, later
/// ones only carry progress.
async fn apply_running(
    state: &AppState,
    job_id: Uuid,
    progress_pct: Option<i16>,
) -> AppResult<Job> {
    match JobRepo::mark_running(&state.pool, job_id).await? {
        TransitionOutcome::Applied(job) => {
            tracing::info!(job_id = %job.id, "Job running");
            match progress_pct {
                Some(pct) => {
                    let outcome = JobRepo::update_progress(&state.pool, job_id, pct).await?;
                    settle(job_id, outcome, JobStatus::Running)
                }
                None => Ok(job),
            }
        }
        // Already running: a progress-only redelivery or a later update.
        TransitionOutcome::Illegal {
            from: JobStatus::Running,
        } => {
            let pct = progress_pct.unwrap_or(0);
            let outcome = JobRepo::update_progress(&state.pool, job_id, pct).await?;
            settle(job_id, outcome, JobStatus::Running)
        }
        outcome => settle(job_id, outcome, JobStatus::Running),
    }
}

/// Requeue a FAILED job owned by `user_id`: clear error state, reset
/// progress, and re-publish the identical descriptor. Admission is NOT
/// re-run and the quota is NOT re-charged -- the job was charged once at
/// creation.
pub async fn requeue(state: &AppState, job_id: Uuid, user_id: Uuid) -> AppResult<Job> {
    // Ownership first: another user's job is simply not found.
    JobRepo::find_for_user(&state.pool, job_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    let outcome = JobRepo::requeue(&state.pool, job_id).await?;
    let job = settle(job_id, outcome, JobStatus::Queued)?;

    tracing::info!(job_id = %job.id, user_id = %user_id, "Job requeued");

    publish_or_compensate(state, &job).await?;
    Ok(job)
}

/// Collapse a [`TransitionOutcome`] into the updated job or the matching
/// error.
fn settle(job_id: Uuid, outcome: TransitionOutcome, to: JobStatus) -> AppResult<Job> {
    match outcome {
        TransitionOutcome::Applied(job) => Ok(job),
        TransitionOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        })),
        TransitionOutcome::Illegal { from } => Err(TransitionError { from, to }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_payload_accepts_known_statuses() {
        let callback: WorkerCallback = serde_json::from_value(serde_json::json!({
            "status": "SUCCEEDED",
            "outputKey": "output/abc.mp4",
        }))
        .unwrap();
        assert_eq!(callback.status, JobStatus::Succeeded);
        assert_eq!(callback.output_key.as_deref(), Some("output/abc.mp4"));
        assert_eq!(callback.progress_pct, None);
    }

    #[test]
    fn callback_payload_rejects_unknown_status() {
        let result: Result<WorkerCallback, _> = serde_json::from_value(serde_json::json!({
            "status": "CANCELLED",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn callback_payload_is_camel_case() {
        let callback: WorkerCallback = serde_json::from_value(serde_json::json!({
            "status": "RUNNING",
            "progressPct": 40,
        }))
        .unwrap();
        assert_eq!(callback.progress_pct, Some(40));

        // snake_case keys are not part of the worker protocol.
        let callback: WorkerCallback = serde_json::from_value(serde_json::json!({
            "status": "RUNNING",
            "progress_pct": 40,
        }))
        .unwrap();
        assert_eq!(callback.progress_pct, None);
    }
}
