//! Repository for the `jobs` table: admission-time creation and the guarded
//! state-machine transitions.
//!
//! Every transition locks the job row (`SELECT ... FOR UPDATE`), validates
//! the current status, applies the update and appends the audit event inside
//! one transaction. Callbacks may be duplicated or arrive out of order; the
//! row lock plus the status checks make each transition idempotent-safe.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use fuze_core::job_status::JobStatus;
use fuze_core::types::Timestamp;

use crate::models::job::{Job, JobListQuery};
use crate::repositories::job_event_repo::JobEventRepo;
use crate::repositories::media_asset_repo::{MediaAssetRepo, NewOutputAsset};
use crate::repositories::usage_repo::UsageRepo;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, user_id, status, processors, options, weight_used, progress_pct, \
    error_code, error_message, source_asset_id, target_asset_id, \
    audio_asset_id, output_asset_id, created_at, started_at, finished_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Fields for a job being admitted into the queue.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub user_id: Uuid,
    pub source_asset_id: Uuid,
    pub target_asset_id: Uuid,
    pub audio_asset_id: Option<Uuid>,
    pub processors: Vec<String>,
    pub options: serde_json::Value,
    pub weight: i64,
}

/// Outcome of a guarded state-machine transition.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// The transition applied (or idempotently short-circuited); the row as
    /// it now stands.
    Applied(Job),
    /// No job with that ID.
    NotFound,
    /// The job is in a state this transition may not leave.
    Illegal { from: JobStatus },
}

/// Provides creation, lookup and state transitions for jobs.
pub struct JobRepo;

impl JobRepo {
    /// Admit a job: charge the usage counter and insert the QUEUED row as a
    /// single transaction.
    ///
    /// The conditional charge is the authoritative quota guard -- when it
    /// refuses (`jobs_total + weight` would exceed `quota`) the transaction
    /// rolls back, nothing is written, and `Ok(None)` is returned.
    pub async fn create_admitted(
        pool: &PgPool,
        new: &NewJob,
        period_start: NaiveDate,
        period_end: NaiveDate,
        quota: i64,
    ) -> Result<Option<Job>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        UsageRepo::ensure_counter(&mut *tx, new.user_id, period_start, period_end).await?;

        let charged = UsageRepo::try_charge(
            &mut *tx,
            new.user_id,
            period_start,
            period_end,
            new.weight,
            quota,
        )
        .await?;
        if !charged {
            tracing::debug!(
                user_id = %new.user_id,
                weight = new.weight,
                quota,
                "Usage charge refused; admission rolled back",
            );
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO jobs \
                 (id, user_id, status, processors, options, weight_used, \
                  source_asset_id, target_asset_id, audio_asset_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(Uuid::now_v7())
            .bind(new.user_id)
            .bind(JobStatus::Queued.as_str())
            .bind(&new.processors)
            .bind(&new.options)
            .bind(new.weight)
            .bind(new.source_asset_id)
            .bind(new.target_asset_id)
            .bind(new.audio_asset_id)
            .fetch_one(&mut *tx)
            .await?;

        JobEventRepo::append(&mut *tx, job.id, None, JobStatus::Queued, "Job admitted and enqueued")
            .await?;

        tx.commit().await?;
        Ok(Some(job))
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a job by ID scoped to its owner.
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's jobs, newest first, with pagination.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// QUEUED -> RUNNING on the first worker acknowledgement; sets
    /// `started_at`.
    pub async fn mark_running(pool: &PgPool, id: Uuid) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(job) = Self::lock_row(&mut tx, id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let from = Self::decode_status(&job)?;
        if from != JobStatus::Queued {
            return Ok(TransitionOutcome::Illegal { from });
        }

        let query = format!(
            "UPDATE jobs SET status = $2, started_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(JobStatus::Running.as_str())
            .fetch_one(&mut *tx)
            .await?;

        JobEventRepo::append(&mut *tx, id, Some(from), JobStatus::Running, "Worker acknowledged job")
            .await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(updated))
    }

    /// Monotonic progress update within RUNNING. A stale or duplicate
    /// percentage (`pct <= current`) is a no-op, not an error, so queue
    /// redelivery and out-of-order progress callbacks are harmless. No
    /// event is appended; the status does not change.
    pub async fn update_progress(
        pool: &PgPool,
        id: Uuid,
        pct: i16,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(job) = Self::lock_row(&mut tx, id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let from = Self::decode_status(&job)?;
        if from != JobStatus::Running {
            return Ok(TransitionOutcome::Illegal { from });
        }

        if pct <= job.progress_pct {
            return Ok(TransitionOutcome::Applied(job));
        }

        let query =
            format!("UPDATE jobs SET progress_pct = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let updated = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(pct)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(updated))
    }

    /// RUNNING -> SUCCEEDED: create the output asset (probe metadata
    /// inherited from the target asset), link it, stamp `finished_at` and
    /// force progress to 100, all in one transaction.
    ///
    /// Success callbacks are redelivered at least once; a job already
    /// SUCCEEDED with the same `output_key` short-circuits without creating
    /// a second asset or event.
    pub async fn complete(
        pool: &PgPool,
        id: Uuid,
        output_bucket: &str,
        output_key: &str,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(job) = Self::lock_row(&mut tx, id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let from = Self::decode_status(&job)?;

        if from == JobStatus::Succeeded {
            if let Some(output_id) = job.output_asset_id {
                let existing_key = MediaAssetRepo::object_key(&mut *tx, output_id).await?;
                if existing_key.as_deref() == Some(output_key) {
                    return Ok(TransitionOutcome::Applied(job));
                }
            }
            return Ok(TransitionOutcome::Illegal { from });
        }
        if from != JobStatus::Running {
            return Ok(TransitionOutcome::Illegal { from });
        }

        let target = MediaAssetRepo::find_by_id(&mut *tx, job.target_asset_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let output = MediaAssetRepo::insert_output(
            &mut *tx,
            &NewOutputAsset {
                user_id: job.user_id,
                media_type: target.media_type,
                bucket: output_bucket.to_string(),
                object_key: output_key.to_string(),
                mime_type: target.mime_type,
                width: target.width,
                height: target.height,
                duration_sec: target.duration_sec,
            },
        )
        .await?;

        let query = format!(
            "UPDATE jobs \
             SET status = $2, progress_pct = 100, finished_at = NOW(), \
                 output_asset_id = $3, error_code = NULL, error_message = NULL \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(JobStatus::Succeeded.as_str())
            .bind(output.id)
            .fetch_one(&mut *tx)
            .await?;

        JobEventRepo::append(&mut *tx, id, Some(from), JobStatus::Succeeded, "Worker finished")
            .await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(updated))
    }

    /// Transition to FAILED from one of `allowed_from`, storing the error
    /// code and message and stamping `finished_at`.
    ///
    /// Callers pick the allowed source states: a worker failure callback may
    /// only fail a RUNNING job, while dispatch-failure compensation and the
    /// stuck-job sweep also fail QUEUED jobs.
    pub async fn fail(
        pool: &PgPool,
        id: Uuid,
        allowed_from: &[JobStatus],
        error_code: &str,
        error_message: &str,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(job) = Self::lock_row(&mut tx, id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let from = Self::decode_status(&job)?;
        if !allowed_from.contains(&from) {
            return Ok(TransitionOutcome::Illegal { from });
        }

        let query = format!(
            "UPDATE jobs \
             SET status = $2, finished_at = NOW(), error_code = $3, error_message = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(JobStatus::Failed.as_str())
            .bind(error_code)
            .bind(error_message)
            .fetch_one(&mut *tx)
            .await?;

        JobEventRepo::append(&mut *tx, id, Some(from), JobStatus::Failed, error_message).await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(updated))
    }

    /// FAILED -> QUEUED: clear error fields and timestamps, reset progress.
    /// The weight charged at admission stands; requeue never re-charges.
    pub async fn requeue(pool: &PgPool, id: Uuid) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(job) = Self::lock_row(&mut tx, id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let from = Self::decode_status(&job)?;
        if from != JobStatus::Failed {
            return Ok(TransitionOutcome::Illegal { from });
        }

        let query = format!(
            "UPDATE jobs \
             SET status = $2, progress_pct = 0, error_code = NULL, error_message = NULL, \
                 started_at = NULL, finished_at = NULL \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(JobStatus::Queued.as_str())
            .fetch_one(&mut *tx)
            .await?;

        JobEventRepo::append(&mut *tx, id, Some(from), JobStatus::Queued, "Job requeued").await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(updated))
    }

    /// IDs of jobs stuck past their deadline: QUEUED older than
    /// `queued_cutoff` (by `created_at`) or RUNNING older than
    /// `running_cutoff` (by `started_at`).
    pub async fn list_stale(
        pool: &PgPool,
        queued_cutoff: Timestamp,
        running_cutoff: Timestamp,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM jobs \
             WHERE (status = $1 AND created_at < $2) \
                OR (status = $3 AND COALESCE(started_at, created_at) < $4) \
             ORDER BY created_at ASC",
        )
        .bind(JobStatus::Queued.as_str())
        .bind(queued_cutoff)
        .bind(JobStatus::Running.as_str())
        .bind(running_cutoff)
        .fetch_all(pool)
        .await
    }

    /// Lock a job row for the duration of a transition transaction.
    async fn lock_row(tx: &mut PgConnection, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(tx)
            .await
    }

    /// Decode the locked row's status string. The schema CHECK keeps the
    /// column within the known set, so a failure here is a schema/code skew.
    fn decode_status(job: &Job) -> Result<JobStatus, sqlx::Error> {
        job.job_status().ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown job status '{}'", job.status).into())
        })
    }
}
