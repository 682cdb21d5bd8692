use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fuze_core::admission::AdmissionError;
use fuze_core::error::CoreError;
use fuze_core::job_status::TransitionError;
use fuze_nsq::NsqError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors from `fuze-core` and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ "error": <message>, "code": <machine code> }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A generic domain error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A job request was refused by the admission chain.
    #[error(transparent)]
    Admission(#[from] AdmissionError),

    /// A job state transition outside the legal table was attempted.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The queue refused an admitted job; the job was compensated to FAILED
    /// and the quota charge stands.
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] NsqError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Admission(admission) => {
                let (status, code) = classify_admission_error(admission);
                (status, code, admission.to_string())
            }

            AppError::Transition(err) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
            }

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Dispatch(err) => {
                tracing::error!(error = %err, "Dispatch error");
                (
                    StatusCode::BAD_GATEWAY,
                    "DISPATCH_ERROR",
                    "Failed to dispatch job to the worker queue".to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// HTTP status and machine code for each admission rejection.
///
/// Plan-limit rejections are 403 (the caller's plan forbids the request),
/// an unknown processor name is a 400 (malformed request), a plan with no
/// usable entitlement is a 404/422 depending on whether the blob is absent
/// or unusable.
fn classify_admission_error(err: &AdmissionError) -> (StatusCode, &'static str) {
    match err {
        AdmissionError::NoActiveSubscription => {
            (StatusCode::FORBIDDEN, "NO_ACTIVE_SUBSCRIPTION")
        }
        AdmissionError::NoEntitlement => (StatusCode::NOT_FOUND, "NO_ENTITLEMENT"),
        AdmissionError::InvalidEntitlement(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ENTITLEMENT")
        }
        AdmissionError::UnknownProcessor(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_PROCESSOR"),
        AdmissionError::ExceedsProcessorCount { .. } => {
            (StatusCode::FORBIDDEN, "EXCEEDS_PROCESSOR_COUNT")
        }
        AdmissionError::ExceedsJobWeight { .. } => (StatusCode::FORBIDDEN, "EXCEEDS_JOB_WEIGHT"),
        AdmissionError::QuotaExceeded { .. } => (StatusCode::FORBIDDEN, "QUOTA_EXCEEDED"),
        AdmissionError::ExceedsMediaLimit(_) => (StatusCode::FORBIDDEN, "EXCEEDS_MEDIA_LIMIT"),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuze_core::job_status::JobStatus;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn admission_rejections_map_to_expected_statuses() {
        assert_eq!(
            status_of(AdmissionError::NoActiveSubscription.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AdmissionError::NoEntitlement.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AdmissionError::UnknownProcessor("warp".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                AdmissionError::QuotaExceeded {
                    used: 8,
                    requested: 3,
                    quota: 10
                }
                .into()
            ),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AdmissionError::InvalidEntitlement("missing field".into()).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn invalid_transition_is_a_conflict() {
        let err = TransitionError {
            from: JobStatus::Succeeded,
            to: JobStatus::Running,
        };
        assert_eq!(status_of(err.into()), StatusCode::CONFLICT);
    }

    #[test]
    fn bad_worker_secret_is_unauthorized() {
        let err = AppError::Core(CoreError::Unauthorized("invalid worker secret".into()));
        assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let response = AppError::InternalError("connection string was ...".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
