//! Periodic sweep for jobs stuck in QUEUED or RUNNING.
//!
//! QUEUED is only provisional acceptance; terminal states normally arrive
//! via worker callback. When a callback never comes (worker crash, queue
//! loss), the job would sit in flight forever -- this sweep fails it with
//! `TIMEOUT` after a deadline so the user can see it and requeue. The usage
//! charge is not refunded.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use fuze_core::job_status::{JobStatus, ERROR_CODE_TIMEOUT};
use fuze_db::repositories::{JobRepo, TransitionOutcome};

/// Default deadline before an in-flight job is considered stuck.
const DEFAULT_TIMEOUT_MINS: i64 = 60;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300); // 5 minutes

/// Run the stuck-job sweep loop.
///
/// Fails QUEUED jobs older than `JOB_TIMEOUT_MINS` (by `created_at`) and
/// RUNNING jobs older than the same deadline (by `started_at`). Runs until
/// `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let timeout_mins: i64 = std::env::var("JOB_TIMEOUT_MINS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_MINS);

    tracing::info!(
        timeout_mins,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Stuck-job sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Stuck-job sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, timeout_mins).await {
                    Ok(failed) => {
                        if failed > 0 {
                            tracing::warn!(failed, "Stuck-job sweep: failed stale jobs");
                        } else {
                            tracing::debug!("Stuck-job sweep: nothing stale");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Stuck-job sweep failed");
                    }
                }
            }
        }
    }
}

/// One sweep cycle: collect stale job IDs, fail each through the normal
/// guarded transition so the event log stays consistent. A job that races a
/// real callback between the listing and the transition is skipped.
async fn sweep_once(pool: &PgPool, timeout_mins: i64) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - chrono::Duration::minutes(timeout_mins);
    let stale = JobRepo::list_stale(pool, cutoff, cutoff).await?;

    let mut failed = 0;
    for job_id in stale {
        let outcome = JobRepo::fail(
            pool,
            job_id,
            &[JobStatus::Queued, JobStatus::Running],
            ERROR_CODE_TIMEOUT,
            "Job exceeded its processing deadline",
        )
        .await?;

        match outcome {
            TransitionOutcome::Applied(_) => {
                tracing::warn!(%job_id, "Stuck job failed with TIMEOUT");
                failed += 1;
            }
            TransitionOutcome::Illegal { from } => {
                tracing::debug!(%job_id, %from, "Stale job settled before sweep; skipping");
            }
            TransitionOutcome::NotFound => {}
        }
    }

    Ok(failed)
}
