//! Handlers for the `/jobs` resource.
//!
//! All endpoints here require authentication via [`AuthUser`]; users only
//! ever see their own jobs. The worker callback lives in
//! [`crate::handlers::callbacks`] and authenticates with the shared secret
//! instead.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use fuze_core::error::CoreError;
use fuze_db::models::job::{Job, JobListQuery, SubmitJob};
use fuze_db::repositories::{JobEventRepo, JobRepo};

use crate::engine::{admission, dispatcher};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fetch a job by ID scoped to the caller.
async fn find_owned(pool: &sqlx::PgPool, job_id: Uuid, auth: &AuthUser) -> AppResult<Job> {
    JobRepo::find_for_user(pool, job_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))
}

/// POST /api/v1/jobs
///
/// Run the admission chain for a new job. Returns 201 with the QUEUED job,
/// or the admission error -- all rejections happen before any row exists.
pub async fn submit_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitJob>,
) -> AppResult<impl IntoResponse> {
    let job = admission::admit(&state, auth.user_id, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

/// GET /api/v1/jobs
///
/// List the caller's jobs, newest first. Supports `limit`/`offset`.
pub async fn list_jobs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = JobRepo::list_for_user(&state.pool, auth.user_id, &params).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/{id}
///
/// Get a single job by ID. Another user's job is simply not found.
pub async fn get_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let job = find_owned(&state.pool, job_id, &auth).await?;
    Ok(Json(DataResponse { data: job }))
}

/// GET /api/v1/jobs/{id}/events
///
/// The append-only transition log for one of the caller's jobs, oldest
/// first.
pub async fn list_job_events(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    find_owned(&state.pool, job_id, &auth).await?;

    let events = JobEventRepo::list_for_job(&state.pool, job_id).await?;
    Ok(Json(DataResponse { data: events }))
}

/// POST /api/v1/jobs/{id}/requeue
///
/// Return a FAILED job to the queue. Only the owner may requeue, only from
/// FAILED, and the job is re-published as-is -- admission is not re-run and
/// no quota is re-charged.
pub async fn requeue_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let job = dispatcher::requeue(&state, job_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: job }))
}
