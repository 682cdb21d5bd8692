//! Repository for the `features` catalog table.

use sqlx::PgPool;

use crate::models::feature::{Feature, FeatureStatus, FeatureType};

/// Column list for `features` queries.
const COLUMNS: &str = "id, name, feature_type, weight, status, category, created_at";

/// Read access to the processor catalog.
pub struct FeatureRepo;

impl FeatureRepo {
    /// Fetch the ACTIVE `type = 'processor'` rows matching the given names.
    ///
    /// Names absent from the result were either never registered or are
    /// inactive; admission treats both as unknown processors.
    pub async fn find_active_processors_by_names(
        pool: &PgPool,
        names: &[String],
    ) -> Result<Vec<Feature>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM features \
             WHERE name = ANY($1) AND feature_type = $2 AND status = $3"
        );
        sqlx::query_as::<_, Feature>(&query)
            .bind(names)
            .bind(FeatureType::Processor.as_str())
            .bind(FeatureStatus::Active.as_str())
            .fetch_all(pool)
            .await
    }

    /// List all ACTIVE processors, heaviest first.
    pub async fn list_active_processors(pool: &PgPool) -> Result<Vec<Feature>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM features \
             WHERE feature_type = $1 AND status = $2 \
             ORDER BY weight DESC, name ASC"
        );
        sqlx::query_as::<_, Feature>(&query)
            .bind(FeatureType::Processor.as_str())
            .bind(FeatureStatus::Active.as_str())
            .fetch_all(pool)
            .await
    }
}
