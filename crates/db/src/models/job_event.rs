//! Append-only job transition log.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use fuze_core::types::{DbId, Timestamp};

/// A row from the `job_events` table. `from_status` is NULL for the initial
/// enqueue event written at admission.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobEvent {
    pub id: DbId,
    pub job_id: Uuid,
    pub from_status: Option<String>,
    pub to_status: String,
    pub message: Option<String>,
    pub created_at: Timestamp,
}
