//! Read-only catalog handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use fuze_db::repositories::FeatureRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/processors
///
/// List the ACTIVE processors clients may request, heaviest first, with
/// their weights so clients can show cost before submitting.
pub async fn list_processors(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let processors = FeatureRepo::list_active_processors(&state.pool).await?;
    Ok(Json(DataResponse { data: processors }))
}
