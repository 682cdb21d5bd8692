//! Route definitions for the `/quota` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::quota;
use crate::state::AppState;

/// Routes mounted at `/quota`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(quota::quota_summary))
}
