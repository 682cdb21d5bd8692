//! Media asset rows. Bytes live in object storage; this table only tracks
//! ownership, location and probe metadata.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use fuze_core::types::Timestamp;

/// A row from the `media_assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaAsset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_type: String,
    pub bucket: String,
    pub object_key: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub duration_sec: Option<i64>,
    pub created_at: Timestamp,
}
