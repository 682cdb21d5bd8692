//! Route definitions for the `/processors` catalog resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::processors;
use crate::state::AppState;

/// Routes mounted at `/processors`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(processors::list_processors))
}
