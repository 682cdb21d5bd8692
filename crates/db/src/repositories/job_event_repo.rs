//! Repository for the append-only `job_events` table.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use fuze_core::job_status::JobStatus;

use crate::models::job_event::JobEvent;

/// Column list for `job_events` queries.
const COLUMNS: &str = "id, job_id, from_status, to_status, message, created_at";

/// Append and list job transition events. Rows are never updated or deleted.
pub struct JobEventRepo;

impl JobEventRepo {
    /// Append one transition event. Takes an executor so transitions and
    /// their events commit in the same transaction.
    pub async fn append(
        executor: impl PgExecutor<'_>,
        job_id: Uuid,
        from_status: Option<JobStatus>,
        to_status: JobStatus,
        message: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO job_events (job_id, from_status, to_status, message) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(job_id)
        .bind(from_status.map(JobStatus::as_str))
        .bind(to_status.as_str())
        .bind(message)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// The full event trail for a job, oldest first.
    pub async fn list_for_job(pool: &PgPool, job_id: Uuid) -> Result<Vec<JobEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM job_events WHERE job_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, JobEvent>(&query)
            .bind(job_id)
            .fetch_all(pool)
            .await
    }
}
