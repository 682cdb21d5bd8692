//! Repository for the `media_assets` table.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::media_asset::MediaAsset;

/// Column list for `media_assets` queries.
const COLUMNS: &str = "id, user_id, media_type, bucket, object_key, mime_type, \
     size_bytes, width, height, duration_sec, created_at";

/// Fields for a worker-produced output asset. Probe metadata is inherited
/// from the job's target asset; bytes already live at `bucket/object_key`.
#[derive(Debug, Clone)]
pub struct NewOutputAsset {
    pub user_id: Uuid,
    pub media_type: String,
    pub bucket: String,
    pub object_key: String,
    pub mime_type: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub duration_sec: Option<i64>,
}

/// Access to media asset rows.
pub struct MediaAssetRepo;

impl MediaAssetRepo {
    /// Find an asset by its ID. Takes an executor so it works both on the
    /// pool and inside transition transactions.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<MediaAsset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM media_assets WHERE id = $1");
        sqlx::query_as::<_, MediaAsset>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The object key of an asset, for output idempotency checks.
    pub async fn object_key(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT object_key FROM media_assets WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Insert a worker output asset. Takes an executor so the insert commits
    /// in the same transaction as the RUNNING -> SUCCEEDED job update.
    pub async fn insert_output(
        executor: impl PgExecutor<'_>,
        output: &NewOutputAsset,
    ) -> Result<MediaAsset, sqlx::Error> {
        let query = format!(
            "INSERT INTO media_assets \
                 (id, user_id, media_type, bucket, object_key, mime_type, \
                  width, height, duration_sec) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MediaAsset>(&query)
            .bind(Uuid::now_v7())
            .bind(output.user_id)
            .bind(&output.media_type)
            .bind(&output.bucket)
            .bind(&output.object_key)
            .bind(output.mime_type.as_deref())
            .bind(output.width)
            .bind(output.height)
            .bind(output.duration_sec)
            .fetch_one(executor)
            .await
    }
}
