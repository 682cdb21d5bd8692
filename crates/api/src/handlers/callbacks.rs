//! The worker callback endpoint.
//!
//! Workers report progress and completion here, authenticated by the shared
//! secret header rather than a user token. A bad or missing secret rejects
//! the request before any state is read or written.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use fuze_core::error::CoreError;

use crate::engine::dispatcher::{self, WorkerCallback};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Header the worker pool presents on every callback.
const WORKER_SECRET_HEADER: &str = "x-worker-secret";

/// POST /api/v1/jobs/{id}/callback
///
/// Apply a worker callback to the job state machine. Idempotent under queue
/// redelivery; transitions outside the legal table are 409s with no side
/// effects.
pub async fn job_callback(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    headers: HeaderMap,
    Json(callback): Json<WorkerCallback>,
) -> AppResult<impl IntoResponse> {
    authorize_worker(&headers, &state)?;

    let job = dispatcher::apply_callback(&state, job_id, &callback).await?;
    Ok(Json(DataResponse { data: job }))
}

/// Compare the shared-secret header against the configured value.
fn authorize_worker(headers: &HeaderMap, state: &AppState) -> AppResult<()> {
    let presented = headers
        .get(WORKER_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(secret) if secret == state.config.worker_secret => Ok(()),
        _ => Err(AppError::Core(CoreError::Unauthorized(
            "Invalid worker secret".into(),
        ))),
    }
}
