use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fuze_db::DbPool,
    /// Server configuration (secrets, timeouts, buckets).
    pub config: Arc<ServerConfig>,
    /// Queue publish client for admitted jobs.
    pub queue: Arc<fuze_nsq::NsqClient>,
}
