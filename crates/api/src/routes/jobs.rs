//! Route definitions for the `/jobs` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{callbacks, jobs};
use crate::state::AppState;

/// Routes mounted at `/jobs`.
///
/// ```text
/// GET    /                 -> list_jobs
/// POST   /                 -> submit_job
/// GET    /{id}             -> get_job
/// GET    /{id}/events      -> list_job_events
/// POST   /{id}/requeue     -> requeue_job
/// POST   /{id}/callback    -> job_callback (worker secret, not JWT)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::submit_job))
        .route("/{id}", get(jobs::get_job))
        .route("/{id}/events", get(jobs::list_job_events))
        .route("/{id}/requeue", post(jobs::requeue_job))
        .route("/{id}/callback", post(callbacks::job_callback))
}
