pub mod health;
pub mod jobs;
pub mod processors;
pub mod quota;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /jobs                    list, submit
/// /jobs/{id}               get
/// /jobs/{id}/events        transition log
/// /jobs/{id}/requeue       FAILED -> QUEUED (owner only)
/// /jobs/{id}/callback      worker callback (shared secret)
/// /processors              active catalog
/// /quota                   current-period quota summary
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/jobs", jobs::router())
        .nest("/processors", processors::router())
        .nest("/quota", quota::router())
}
