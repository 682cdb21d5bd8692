/// Catalog-style primary keys (plans, entitlement versions, features) are
/// PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
