//! Job entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use fuze_core::job_status::JobStatus;
use fuze_core::types::Timestamp;

/// A row from the `jobs` table.
///
/// `weight_used` is fixed at admission and never recomputed; `status` holds
/// one of the [`JobStatus`] strings enforced by the schema CHECK.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub processors: Vec<String>,
    pub options: serde_json::Value,
    pub weight_used: i64,
    pub progress_pct: i16,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub source_asset_id: Uuid,
    pub target_asset_id: Uuid,
    pub audio_asset_id: Option<Uuid>,
    pub output_asset_id: Option<Uuid>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

impl Job {
    /// Decode the stored status string.
    ///
    /// The schema CHECK keeps the column within the known set, so `None`
    /// only occurs on a schema/code mismatch.
    pub fn job_status(&self) -> Option<JobStatus> {
        JobStatus::parse(&self.status)
    }
}

/// DTO for submitting a new job via `POST /api/v1/jobs`.
#[derive(Debug, Deserialize)]
pub struct SubmitJob {
    pub source_asset_id: Uuid,
    pub target_asset_id: Uuid,
    pub audio_asset_id: Option<Uuid>,
    pub processors: Vec<String>,
    pub options: Option<serde_json::Value>,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
